//! Console commands: token lists in, typed executor calls out.
//!
//! `args` never includes the command name.

use hal::PinId;

use crate::args::{check_arg_count, to_int, to_long, to_uint, to_ulong};
use crate::callback::CallbackKind;
use crate::error::CommandError;
use crate::executor::{CommandOutcome, Metadata, TimerTester};

/// What a command hands to the reporting layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Outcome(CommandOutcome),
    Metadata(Metadata),
}

impl From<CommandOutcome> for Reply {
    fn from(outcome: CommandOutcome) -> Self {
        Self::Outcome(outcome)
    }
}

pub type CommandResult = Result<Reply, CommandError>;

/// Entry point signature shared by every console command.
pub type Handler = fn(&TimerTester, &[&str]) -> CommandResult;

pub fn cmd_timer_init(tester: &TimerTester, args: &[&str]) -> CommandResult {
    check_arg_count(args, 3, 3, "DEV FREQ CALLBACK")?;
    let dev = tester.resolve_device(args[0])?;
    let freq = u32::try_from(to_long(args[1])?).map_err(|_| CommandError::ArgumentParse {
        token: args[1].to_owned(),
    })?;
    let kind: CallbackKind = args[2].parse()?;
    Ok(tester.init(dev, freq, kind).into())
}

fn timer_set(tester: &TimerTester, args: &[&str], absolute: bool) -> CommandResult {
    check_arg_count(args, 3, 3, "DEV CHANNEL TICKS")?;
    let dev = tester.resolve_device(args[0])?;
    let channel = to_int(args[1])?;
    let ticks = to_uint(args[2])?;
    let outcome = if absolute {
        tester.set_absolute(dev, channel, ticks)
    } else {
        tester.set(dev, channel, ticks)
    };
    Ok(outcome.into())
}

pub fn cmd_timer_set(tester: &TimerTester, args: &[&str]) -> CommandResult {
    timer_set(tester, args, false)
}

pub fn cmd_timer_set_absolute(tester: &TimerTester, args: &[&str]) -> CommandResult {
    timer_set(tester, args, true)
}

pub fn cmd_timer_clear(tester: &TimerTester, args: &[&str]) -> CommandResult {
    check_arg_count(args, 2, 2, "DEV CHANNEL")?;
    let dev = tester.resolve_device(args[0])?;
    let channel = to_int(args[1])?;
    Ok(tester.clear(dev, channel).into())
}

pub fn cmd_timer_read(tester: &TimerTester, args: &[&str]) -> CommandResult {
    check_arg_count(args, 1, 1, "DEV")?;
    let dev = tester.resolve_device(args[0])?;
    Ok(CommandOutcome::value(tester.read(dev).into()).into())
}

pub fn cmd_timer_start(tester: &TimerTester, args: &[&str]) -> CommandResult {
    check_arg_count(args, 1, 1, "DEV")?;
    let dev = tester.resolve_device(args[0])?;
    tester.start(dev);
    Ok(CommandOutcome::ok().into())
}

pub fn cmd_timer_stop(tester: &TimerTester, args: &[&str]) -> CommandResult {
    check_arg_count(args, 1, 1, "DEV")?;
    let dev = tester.resolve_device(args[0])?;
    tester.stop(dev);
    Ok(CommandOutcome::ok().into())
}

pub fn cmd_timer_debug_pin(tester: &TimerTester, args: &[&str]) -> CommandResult {
    check_arg_count(args, 3, 3, "DEV PORT PIN")?;
    let dev = tester.resolve_device(args[0])?;

    let parsed = match (to_ulong(args[1]), to_ulong(args[2])) {
        (Ok(port), Ok(pin)) => u32::try_from(port).ok().zip(u32::try_from(pin).ok()),
        _ => None,
    };
    let Some((port, pin)) = parsed else {
        // A bad pin is a failed command, not an argument error.
        return Ok(CommandOutcome::failed().into());
    };

    Ok(tester.configure_debug_pin(dev, PinId::new(port, pin)).into())
}

pub fn cmd_timer_read_bench(tester: &TimerTester, args: &[&str]) -> CommandResult {
    check_arg_count(args, 2, 2, "DEV REPEAT")?;
    let dev = tester.resolve_device(args[0])?;
    let repeat = to_uint(args[1])?;
    tester.read_bench(dev, repeat);
    Ok(CommandOutcome::ok().into())
}

pub fn cmd_get_metadata(tester: &TimerTester, _args: &[&str]) -> CommandResult {
    Ok(Reply::Metadata(tester.metadata()))
}
