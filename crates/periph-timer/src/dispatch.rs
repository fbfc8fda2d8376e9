//! Command table and result reporting.

use std::io::{self, Write};

use crate::commands::{self, Handler, Reply};
use crate::error::{CommandError, RESULT_OK};
use crate::executor::TimerTester;

/// One console command.
#[derive(Clone, Copy)]
pub struct ShellCommand {
    pub name: &'static str,
    pub help: &'static str,
    pub handler: Handler,
}

/// Every command the console understands.
pub static COMMANDS: &[ShellCommand] = &[
    ShellCommand {
        name: "timer_init",
        help: "Initialize timer device",
        handler: commands::cmd_timer_init,
    },
    ShellCommand {
        name: "timer_set",
        help: "set timer to relative value",
        handler: commands::cmd_timer_set,
    },
    ShellCommand {
        name: "timer_set_absolute",
        help: "set timer to absolute value",
        handler: commands::cmd_timer_set_absolute,
    },
    ShellCommand {
        name: "timer_clear",
        help: "clear timer",
        handler: commands::cmd_timer_clear,
    },
    ShellCommand {
        name: "timer_read",
        help: "read timer",
        handler: commands::cmd_timer_read,
    },
    ShellCommand {
        name: "timer_start",
        help: "start timer",
        handler: commands::cmd_timer_start,
    },
    ShellCommand {
        name: "timer_stop",
        help: "stop timer",
        handler: commands::cmd_timer_stop,
    },
    ShellCommand {
        name: "timer_debug_pin",
        help: "config debug pin",
        handler: commands::cmd_timer_debug_pin,
    },
    ShellCommand {
        name: "timer_read_bench",
        help: "execute multiple reads to determine overhead",
        handler: commands::cmd_timer_read_bench,
    },
    ShellCommand {
        name: "get_metadata",
        help: "Get the metadata of the test firmware",
        handler: commands::cmd_get_metadata,
    },
];

/// Exact-name lookup in [`COMMANDS`].
pub fn find(name: &str) -> Option<&'static ShellCommand> {
    COMMANDS.iter().find(|command| command.name == name)
}

/// How a dispatched line ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Command ran; carries its status code.
    Completed(i32),
    /// No command of that name. The caller decides how to report it.
    NotFound(String),
}

/// Runs `argv` (command name first) against `tester`, printing the result.
pub fn execute<W: Write>(tester: &TimerTester, argv: &[&str], out: &mut W) -> io::Result<Dispatch> {
    let Some((&name, args)) = argv.split_first() else {
        return Ok(Dispatch::NotFound(String::new()));
    };

    if name == "help" {
        print_help(out)?;
        return Ok(Dispatch::Completed(RESULT_OK));
    }

    let Some(command) = find(name) else {
        return Ok(Dispatch::NotFound(name.to_owned()));
    };

    log::debug!("dispatch {name} {args:?}");
    let status = match (command.handler)(tester, args) {
        Ok(reply) => report(out, name, &reply)?,
        Err(err) => report_error(out, name, &err)?,
    };
    Ok(Dispatch::Completed(status))
}

/// Prints `Success: <cmd>()[: [<code>]]` or the `Error:` form and returns the
/// command status.
pub fn report<W: Write>(out: &mut W, cmd: &str, reply: &Reply) -> io::Result<i32> {
    match reply {
        Reply::Outcome(outcome) => {
            let verdict = if outcome.success { "Success" } else { "Error" };
            write!(out, "{verdict}: {cmd}()")?;
            if outcome.print_code {
                write!(out, ": [{}]", outcome.code)?;
            }
            writeln!(out)?;
            Ok(outcome.status())
        }
        Reply::Metadata(meta) => {
            writeln!(out, "Success: [{}, {}]", meta.board, meta.application)?;
            Ok(RESULT_OK)
        }
    }
}

/// Prints an argument or device error and returns its status.
pub fn report_error<W: Write>(out: &mut W, cmd: &str, err: &CommandError) -> io::Result<i32> {
    log::debug!("{cmd}: {err:?}");
    writeln!(out, "Error: {err}")?;
    if let CommandError::ArgumentCount { usage } = err {
        writeln!(out, "usage: {cmd} {usage}")?;
    }
    Ok(err.status())
}

/// Lists the command table.
pub fn print_help<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "{:<24} Description", "Command")?;
    writeln!(out, "{}", "-".repeat(40))?;
    for command in COMMANDS {
        writeln!(out, "{:<24} {}", command.name, command.help)?;
    }
    Ok(())
}
