//! Console command parsing

use dmxflow_control::{ColorChannel, Command, CycleInterval, Rgb};

pub const HELP: &str = "\
commands:
  ports                 list serial ports
  connect <port>        open a DMX port
  disconnect            close the port
  red|green|blue <n>    set one colour (0-255) on every fixture
  rgb <r> <g> <b>       set all three colours
  on | off              all channels full / all channels off
  cycle [ms]            start the green/red cycle (default 1000, min 100)
  stop                  stop the cycle
  status                show the current output
  quit                  close the port and exit";

/// What a console line asks for
#[derive(Debug, PartialEq, Eq)]
pub enum ConsoleAction {
    Session(Command),
    ListPorts,
    Help,
    Quit,
    Nothing,
}

/// Parse one input line. Errors are user-facing messages.
pub fn parse_line(line: &str) -> Result<ConsoleAction, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(ConsoleAction::Nothing);
    };
    let args: Vec<&str> = words.collect();

    let command = match verb.to_ascii_lowercase().as_str() {
        "ports" => return Ok(ConsoleAction::ListPorts),
        "help" | "?" => return Ok(ConsoleAction::Help),
        "quit" | "exit" => return Ok(ConsoleAction::Quit),
        "connect" => match args.as_slice() {
            [port] => Command::Connect(port.to_string()),
            _ => return Err("usage: connect <port>".to_string()),
        },
        "disconnect" => Command::Disconnect,
        "red" => Command::SetChannel(ColorChannel::Red, single_value(&args)?),
        "green" => Command::SetChannel(ColorChannel::Green, single_value(&args)?),
        "blue" => Command::SetChannel(ColorChannel::Blue, single_value(&args)?),
        "rgb" => match args.as_slice() {
            [r, g, b] => Command::SetRgb(Rgb::new(intensity(r)?, intensity(g)?, intensity(b)?)),
            _ => return Err("usage: rgb <r> <g> <b>".to_string()),
        },
        "on" => Command::AllOn,
        "off" => Command::AllOff,
        "cycle" => Command::StartCycle(CycleInterval::parse(args.first().copied().unwrap_or(""))),
        "stop" => Command::StopCycle,
        "status" => Command::Status,
        other => return Err(format!("unknown command '{}', try 'help'", other)),
    };

    Ok(ConsoleAction::Session(command))
}

fn single_value(args: &[&str]) -> Result<u8, String> {
    match args {
        [value] => intensity(value),
        _ => Err("expected one value between 0 and 255".to_string()),
    }
}

fn intensity(text: &str) -> Result<u8, String> {
    text.parse::<u8>()
        .map_err(|_| format!("'{}' is not a value between 0 and 255", text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colour_commands() {
        assert_eq!(
            parse_line("red 128"),
            Ok(ConsoleAction::Session(Command::SetChannel(
                ColorChannel::Red,
                128
            )))
        );
        assert_eq!(
            parse_line("  RGB 1 2 3 "),
            Ok(ConsoleAction::Session(Command::SetRgb(Rgb::new(1, 2, 3))))
        );
        assert!(parse_line("green 256").is_err());
        assert!(parse_line("blue").is_err());
    }

    #[test]
    fn test_cycle_interval_fallback() {
        assert_eq!(
            parse_line("cycle 250"),
            Ok(ConsoleAction::Session(Command::StartCycle(
                CycleInterval::from_millis(250)
            )))
        );
        assert_eq!(
            parse_line("cycle 50"),
            Ok(ConsoleAction::Session(Command::StartCycle(
                CycleInterval::default()
            )))
        );
        assert_eq!(
            parse_line("cycle"),
            Ok(ConsoleAction::Session(Command::StartCycle(
                CycleInterval::default()
            )))
        );
    }

    #[test]
    fn test_misc() {
        assert_eq!(parse_line(""), Ok(ConsoleAction::Nothing));
        assert_eq!(parse_line("quit"), Ok(ConsoleAction::Quit));
        assert_eq!(parse_line("ports"), Ok(ConsoleAction::ListPorts));
        assert_eq!(
            parse_line("connect /dev/ttyUSB0"),
            Ok(ConsoleAction::Session(Command::Connect(
                "/dev/ttyUSB0".to_string()
            )))
        );
        assert!(parse_line("connect").is_err());
        assert!(parse_line("dance").is_err());
    }
}
