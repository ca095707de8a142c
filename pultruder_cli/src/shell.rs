//! Line-command operator session read from stdin.
//!
//! Each line is one panel action. Failed actions are reported and the
//! session carries on, leaving the machine as it was.

use std::io::{BufRead, Write};
use std::str::FromStr;
use std::time::Duration;

use pultruder_core::{Field, RawFields};
use pultruder_traits::Direction;

use crate::display;
use crate::error_fmt::{format_error_json, humanize};
use crate::machine::Machine;

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Set(Field, String),
    Clear(Field),
    Start,
    Pause,
    Resume,
    Restart,
    Status,
    Drive(Direction),
    Release,
    Wait(Duration),
    Quit,
}

impl FromStr for ShellCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let cmd = match word.to_ascii_lowercase().as_str() {
            "set" => {
                let (field, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                ShellCommand::Set(field.parse()?, value.trim().to_string())
            }
            "clear" => ShellCommand::Clear(rest.parse()?),
            "start" => ShellCommand::Start,
            "pause" => ShellCommand::Pause,
            "resume" => ShellCommand::Resume,
            "restart" => ShellCommand::Restart,
            "status" => ShellCommand::Status,
            "drive" => ShellCommand::Drive(if rest.is_empty() {
                Direction::Cw
            } else {
                rest.parse()?
            }),
            "release" => ShellCommand::Release,
            "wait" => {
                let secs: f64 = rest
                    .parse()
                    .map_err(|_| format!("wait needs seconds, got '{rest}'"))?;
                ShellCommand::Wait(
                    Duration::try_from_secs_f64(secs)
                        .map_err(|_| format!("wait needs non-negative seconds, got '{rest}'"))?,
                )
            }
            "quit" | "exit" => ShellCommand::Quit,
            other => return Err(format!("unknown command '{other}'")),
        };
        Ok(cmd)
    }
}

/// Counters reported when the session ends.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ShellSummary {
    pub commands: usize,
    pub errors: usize,
}

pub struct Shell<'a> {
    machine: &'a mut Machine,
    raw: RawFields,
    json: bool,
}

impl<'a> Shell<'a> {
    pub fn new(machine: &'a mut Machine, json: bool) -> Self {
        Self {
            machine,
            raw: RawFields::new(),
            json,
        }
    }

    /// Execute lines until EOF or `quit`.
    pub fn run<R: BufRead, W: Write, E: Write>(
        &mut self,
        input: R,
        out: &mut W,
        err: &mut E,
    ) -> eyre::Result<ShellSummary> {
        let mut summary = ShellSummary::default();
        for line in input.lines() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            summary.commands += 1;
            let cmd = match trimmed.parse::<ShellCommand>() {
                Ok(cmd) => cmd,
                Err(msg) => {
                    summary.errors += 1;
                    self.report(err, &eyre::eyre!(msg))?;
                    continue;
                }
            };
            if cmd == ShellCommand::Quit {
                break;
            }
            if let Err(e) = self.execute(cmd, out) {
                summary.errors += 1;
                self.report(err, &e)?;
            }
        }
        tracing::debug!(commands = summary.commands, errors = summary.errors, "session ended");
        Ok(summary)
    }

    fn execute<W: Write>(&mut self, cmd: ShellCommand, out: &mut W) -> eyre::Result<()> {
        let session = &mut self.machine.session;
        let snap = match cmd {
            ShellCommand::Set(field, value) => {
                self.raw.set(field, value);
                return Ok(());
            }
            ShellCommand::Clear(field) => {
                self.raw.clear(field);
                return Ok(());
            }
            ShellCommand::Start => session.start(&self.raw)?,
            ShellCommand::Pause => session.pause()?,
            ShellCommand::Resume => session.resume()?,
            ShellCommand::Restart => session.restart()?,
            ShellCommand::Status => session.status(),
            ShellCommand::Drive(direction) => {
                session.test_drive(&self.raw, direction)?;
                session.status()
            }
            ShellCommand::Release => {
                session.release_test_drive()?;
                session.status()
            }
            ShellCommand::Wait(d) => {
                self.machine.clock.sleep(d);
                return Ok(());
            }
            ShellCommand::Quit => return Ok(()),
        };
        if self.json {
            writeln!(out, "{}", display::status_json(&snap))?;
        } else {
            writeln!(out, "{}", display::status_line(&snap))?;
        }
        Ok(())
    }

    fn report<E: Write>(&self, err: &mut E, e: &eyre::Report) -> eyre::Result<()> {
        if self.json {
            writeln!(err, "{}", format_error_json(e))?;
        } else {
            writeln!(err, "{}", humanize(e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::{assemble, make_clock};
    use pultruder_config::Config;
    use pultruder_hardware::DriveEvent;

    fn run_script(script: &str, json: bool) -> (String, String, ShellSummary, Machine) {
        let mut machine = assemble(&Config::default(), make_clock(true));
        let mut out = Vec::new();
        let mut err = Vec::new();
        let summary = Shell::new(&mut machine, json)
            .run(script.as_bytes(), &mut out, &mut err)
            .unwrap();
        (
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
            summary,
            machine,
        )
    }

    #[test]
    fn parses_commands() {
        assert_eq!(
            "set line-speed  600 ".parse::<ShellCommand>(),
            Ok(ShellCommand::Set(Field::LineSpeed, "600".into()))
        );
        assert_eq!(
            "set filament_length".parse::<ShellCommand>(),
            Ok(ShellCommand::Set(Field::FilamentLength, String::new()))
        );
        assert_eq!("DRIVE ccw".parse::<ShellCommand>(), Ok(ShellCommand::Drive(Direction::Ccw)));
        assert_eq!(
            "wait 1.5".parse::<ShellCommand>(),
            Ok(ShellCommand::Wait(Duration::from_millis(1500)))
        );
        assert!("wait -1".parse::<ShellCommand>().is_err());
        assert!("jog".parse::<ShellCommand>().is_err());
        assert!("set tension 3".parse::<ShellCommand>().is_err());
    }

    #[test]
    fn pause_resume_cycle_accumulates_running_time_only() {
        let script = "\
set filament_length 10
set line_speed 600
set breaking_force 50
start
wait 30
pause
wait 70
resume
wait 30
status
";
        let (out, err, summary, machine) = run_script(script, false);
        assert_eq!(err, "");
        assert_eq!(summary.errors, 0);
        let last = out.lines().last().unwrap();
        assert_eq!(last, "RUNNING  00:01:00  length 0.600 m  complete 6.0 %");
        assert!(machine.probe.is_driving());
    }

    #[test]
    fn errors_are_reported_and_session_continues() {
        let script = "\
pause
set filament_length abc
start
restart
status
";
        let (out, err, summary, _) = run_script(script, false);
        assert_eq!(summary.errors, 2);
        assert!(err.contains("Cannot pause while the machine is inactive"));
        assert!(err.contains("Filament Length (m) is not a number ('abc')"));
        assert_eq!(out.lines().last().unwrap(), "INACTIVE 00:00:00  length 0.000 m  complete 0.0 %");
    }

    #[test]
    fn huge_wait_saturates_instead_of_overflowing() {
        let script = "\
set filament_length 10
set line_speed 600
set breaking_force 50
start
wait 10000000000000000000
status
";
        let (out, err, summary, _) = run_script(script, false);
        assert_eq!(err, "");
        assert_eq!(summary.errors, 0);
        let last = out.lines().last().unwrap();
        assert!(last.starts_with("RUNNING  876000:00:00"), "got {last}");
        assert!(last.ends_with("complete 100.0 %"), "got {last}");
    }

    #[test]
    fn json_mode_emits_objects() {
        let script = "drive\nset manual_test_speed -40\ndrive cw\nrelease\nquit\nstatus\n";
        let (out, err, summary, machine) = run_script(script, true);
        assert_eq!(summary.commands, 5);
        let e: serde_json::Value = serde_json::from_str(err.lines().next().unwrap()).unwrap();
        assert_eq!(e["field"], "manual_test_speed");
        assert_eq!(out.lines().count(), 2);
        let events = machine.probe.events();
        assert!(matches!(
            events[0],
            DriveEvent::Drive {
                direction: Direction::Ccw,
                ..
            }
        ));
        assert_eq!(events.last(), Some(&DriveEvent::Stop));
    }
}
