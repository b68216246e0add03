//! Console command table

use crate::media::Media;
use crate::pipeline::Pipeline;
use playctl_common::human_time::{format_position, millis_to_nanos};
use playctl_common::{PositionUnit, VolumeFormat};
use std::io::{self, Write};

/// Whether the console loop keeps running after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Quit,
}

type Handler = fn(&dyn Pipeline, &[String], &mut dyn Write) -> io::Result<Outcome>;

pub struct Command {
    pub name: &'static str,
    pub args: &'static str,
    pub required_args: usize,
    pub description: &'static str,
    handler: Handler,
}

pub static COMMANDS: &[Command] = &[
    Command {
        name: "play",
        args: "<URI> [yes|no]",
        required_args: 1,
        description: "plays media with the given URI; with \"no\", it plays after the current one (or now if nothing is playing)",
        handler: cmd_play,
    },
    Command {
        name: "pause",
        args: "<yes|no>",
        required_args: 1,
        description: "pauses playback with \"yes\", resumes otherwise; ignored if nothing is playing",
        handler: cmd_pause,
    },
    Command {
        name: "ispaused",
        args: "",
        required_args: 0,
        description: "checks if playback is currently paused",
        handler: cmd_ispaused,
    },
    Command {
        name: "stop",
        args: "",
        required_args: 0,
        description: "stops any current playback",
        handler: cmd_stop,
    },
    Command {
        name: "seek",
        args: "<milliseconds>",
        required_args: 1,
        description: "seeks to the given position if the media allows seeking",
        handler: cmd_seek,
    },
    Command {
        name: "tell",
        args: "",
        required_args: 0,
        description: "prints the current playback position",
        handler: cmd_tell,
    },
    Command {
        name: "duration",
        args: "",
        required_args: 0,
        description: "prints the duration of the current media",
        handler: cmd_duration,
    },
    Command {
        name: "state",
        args: "",
        required_args: 0,
        description: "prints the pipeline state and the current/next media",
        handler: cmd_state,
    },
    Command {
        name: "setvolume",
        args: "<volume>",
        required_args: 1,
        description: "sets the volume in the 0.0 .. 1.0 range",
        handler: cmd_setvolume,
    },
    Command {
        name: "getvolume",
        args: "",
        required_args: 0,
        description: "prints the volume in the 0.0 .. 1.0 range",
        handler: cmd_getvolume,
    },
    Command {
        name: "mute",
        args: "<yes|no>",
        required_args: 1,
        description: "mutes with \"yes\", unmutes otherwise",
        handler: cmd_mute,
    },
    Command {
        name: "ismuted",
        args: "",
        required_args: 0,
        description: "checks if playback is currently muted",
        handler: cmd_ismuted,
    },
    Command {
        name: "help",
        args: "",
        required_args: 0,
        description: "lists the commands",
        handler: cmd_help,
    },
    Command {
        name: "quit",
        args: "",
        required_args: 0,
        description: "exits the player",
        handler: cmd_quit,
    },
];

pub fn find(name: &str) -> Option<&'static Command> {
    COMMANDS.iter().find(|command| command.name == name)
}

/// Run one tokenized command line
pub fn dispatch(pipeline: &dyn Pipeline, tokens: &[String], out: &mut dyn Write) -> io::Result<Outcome> {
    let Some(name) = tokens.first() else {
        return Ok(Outcome::Continue);
    };

    let Some(command) = find(name) else {
        writeln!(out, "Unknown command \"{}\"", name)?;
        return Ok(Outcome::Continue);
    };

    let given = tokens.len() - 1;
    if given < command.required_args {
        writeln!(
            out,
            "Not enough arguments: expected: {} got: {}",
            command.required_args, given
        )?;
        writeln!(out, "  Usage: {} {}", command.name, command.args)?;
        return Ok(Outcome::Continue);
    }

    (command.handler)(pipeline, tokens, out)
}

fn yes(arg: &str) -> bool {
    arg == "yes"
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn cmd_play(pipeline: &dyn Pipeline, tokens: &[String], out: &mut dyn Write) -> io::Result<Outcome> {
    let now = tokens.get(2).map(|arg| arg != "no").unwrap_or(true);
    let token = pipeline.get_new_token();
    if let Err(e) = pipeline.play_media(token, Media::new(tokens[1].as_str()), now) {
        writeln!(out, "Error: {}", e)?;
    }
    Ok(Outcome::Continue)
}

fn cmd_pause(pipeline: &dyn Pipeline, tokens: &[String], _out: &mut dyn Write) -> io::Result<Outcome> {
    pipeline.set_paused(yes(&tokens[1]));
    Ok(Outcome::Continue)
}

fn cmd_ispaused(pipeline: &dyn Pipeline, _tokens: &[String], out: &mut dyn Write) -> io::Result<Outcome> {
    writeln!(out, "Is currently paused: {}", yes_no(pipeline.is_paused()))?;
    Ok(Outcome::Continue)
}

fn cmd_stop(pipeline: &dyn Pipeline, _tokens: &[String], _out: &mut dyn Write) -> io::Result<Outcome> {
    pipeline.stop();
    Ok(Outcome::Continue)
}

fn cmd_seek(pipeline: &dyn Pipeline, tokens: &[String], out: &mut dyn Write) -> io::Result<Outcome> {
    match tokens[1].parse::<u64>() {
        Ok(millis) => pipeline.set_current_position(millis_to_nanos(millis), PositionUnit::Nanoseconds),
        Err(_) => writeln!(out, "Invalid position \"{}\"", tokens[1])?,
    }
    Ok(Outcome::Continue)
}

fn cmd_tell(pipeline: &dyn Pipeline, _tokens: &[String], out: &mut dyn Write) -> io::Result<Outcome> {
    for unit in PositionUnit::ALL {
        writeln!(
            out,
            "Current position ({}): {}",
            unit,
            format_position(pipeline.get_current_position(unit), unit)
        )?;
    }
    Ok(Outcome::Continue)
}

fn cmd_duration(pipeline: &dyn Pipeline, _tokens: &[String], out: &mut dyn Write) -> io::Result<Outcome> {
    for unit in PositionUnit::ALL {
        writeln!(
            out,
            "Duration ({}): {}",
            unit,
            format_position(pipeline.get_duration(unit), unit)
        )?;
    }
    Ok(Outcome::Continue)
}

fn cmd_state(pipeline: &dyn Pipeline, _tokens: &[String], out: &mut dyn Write) -> io::Result<Outcome> {
    writeln!(out, "Current state: {}", pipeline.get_current_state())?;
    match pipeline.current_media() {
        Some(slot) => writeln!(out, "Current media: {} (token {})", slot.media, slot.token)?,
        None => writeln!(out, "Current media: none")?,
    }
    match pipeline.next_media() {
        Some(slot) => writeln!(out, "Next media: {} (token {})", slot.media, slot.token)?,
        None => writeln!(out, "Next media: none")?,
    }
    Ok(Outcome::Continue)
}

fn cmd_setvolume(pipeline: &dyn Pipeline, tokens: &[String], out: &mut dyn Write) -> io::Result<Outcome> {
    match tokens[1].parse::<f64>() {
        Ok(volume) if (0.0..=1.0).contains(&volume) => pipeline.set_volume(volume, VolumeFormat::Linear),
        _ => writeln!(out, "Invalid volume \"{}\"; expected 0.0 .. 1.0", tokens[1])?,
    }
    Ok(Outcome::Continue)
}

fn cmd_getvolume(pipeline: &dyn Pipeline, _tokens: &[String], out: &mut dyn Write) -> io::Result<Outcome> {
    writeln!(out, "Current volume: {:.3}", pipeline.get_volume(VolumeFormat::Linear))?;
    Ok(Outcome::Continue)
}

fn cmd_mute(pipeline: &dyn Pipeline, tokens: &[String], _out: &mut dyn Write) -> io::Result<Outcome> {
    pipeline.set_muted(yes(&tokens[1]));
    Ok(Outcome::Continue)
}

fn cmd_ismuted(pipeline: &dyn Pipeline, _tokens: &[String], out: &mut dyn Write) -> io::Result<Outcome> {
    writeln!(out, "Is currently muted: {}", yes_no(pipeline.is_muted()))?;
    Ok(Outcome::Continue)
}

fn cmd_help(_pipeline: &dyn Pipeline, _tokens: &[String], out: &mut dyn Write) -> io::Result<Outcome> {
    for command in COMMANDS {
        if command.args.is_empty() {
            writeln!(out, "{}", command.name)?;
        } else {
            writeln!(out, "{} {}", command.name, command.args)?;
        }
        writeln!(out, "    {}", command.description)?;
    }
    Ok(Outcome::Continue)
}

fn cmd_quit(_pipeline: &dyn Pipeline, _tokens: &[String], _out: &mut dyn Write) -> io::Result<Outcome> {
    Ok(Outcome::Quit)
}
