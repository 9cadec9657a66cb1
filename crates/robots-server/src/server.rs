//! The line protocol: one command per line, with a `:`-suffixed command
//! consuming body lines until a blank line. Runs over any `BufRead` +
//! `Write` pair so it can be driven by stdio or, in tests, by in-memory
//! buffers.

use std::io::{self, BufRead, Write};

use robots_core::world::World;

/// Drives one match over the line protocol.
pub struct Server<R, W> {
    input: R,
    output: W,
    world: Option<World>,
    debug: bool,
    ticks: u64,
    running: bool,
}

impl<R: BufRead, W: Write> Server<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output, world: None, debug: false, ticks: 0, running: true }
    }

    /// Process commands until `quit` or end of input.
    pub fn run(&mut self) -> io::Result<()> {
        while self.running {
            let Some((cmd, body)) = self.read_command()? else {
                break;
            };
            if let Err(message) = self.dispatch(&cmd, &body) {
                self.send(&format!("error: {message}"), &[])?;
            }
        }
        Ok(())
    }

    fn dispatch(&mut self, cmd: &str, body: &[String]) -> Result<(), String> {
        match cmd {
            "size" => self.cmd_size(body),
            "debug" => self.cmd_debug(body),
            "load" => self.cmd_load(body),
            "tick" => self.cmd_tick(body),
            "status" => self.cmd_status(body),
            "quit" => {
                self.running = false;
                Ok(())
            }
            other => Err(format!("unknown command: {other}")),
        }
    }

    fn cmd_size(&mut self, body: &[String]) -> Result<(), String> {
        let [w, h] = body else {
            return Err(format!("size expects 2 lines, got {}", body.len()));
        };
        let width: u32 = w.parse().map_err(|_| format!("invalid width: {w}"))?;
        let height: u32 = h.parse().map_err(|_| format!("invalid height: {h}"))?;
        let mut world = World::new(width, height);
        world.set_debug(self.debug);
        self.world = Some(world);
        Ok(())
    }

    fn cmd_debug(&mut self, body: &[String]) -> Result<(), String> {
        self.debug = match body {
            [] => true,
            [value] => value.parse().map_err(|_| format!("invalid bool: {value}"))?,
            _ => return Err(format!("debug expects 0 or 1 lines, got {}", body.len())),
        };
        if let Some(world) = &mut self.world {
            world.set_debug(self.debug);
        }
        Ok(())
    }

    fn cmd_load(&mut self, body: &[String]) -> Result<(), String> {
        let world = self.world.as_mut().ok_or("world not initialized; send size first")?;
        for line in body {
            let (team, path) = line.split_once(' ').ok_or_else(|| format!("malformed load line: {line}"))?;
            let team: u32 = team.parse().map_err(|_| format!("invalid team: {team}"))?;
            let source = std::fs::read_to_string(path).map_err(|e| format!("cannot read {path}: {e}"))?;
            let program = robots_asm::parse(&source).map_err(|e| format!("{path}: {e}"))?;
            world.spawn_random(team, program).map_err(|e| e.to_string())?;
        }
        Ok(())
    }

    fn cmd_tick(&mut self, body: &[String]) -> Result<(), String> {
        let count: u64 = match body {
            [] => 1,
            [value] => value.parse().map_err(|_| format!("invalid count: {value}"))?,
            _ => return Err(format!("tick expects 0 or 1 lines, got {}", body.len())),
        };
        let world = self.world.as_mut().ok_or("world not initialized; send size first")?;
        for _ in 0..count {
            world.tick();
            self.ticks += 1;
            if world.is_over() {
                break;
            }
        }

        let lines: Vec<String> = world
            .robots()
            .map(|r| format!("{} {} {} {}", r.id, r.team, r.position.x, r.position.y))
            .collect();
        self.send("robots", &lines).map_err(|e| e.to_string())
    }

    fn cmd_status(&mut self, body: &[String]) -> Result<(), String> {
        if !body.is_empty() {
            return Err(format!("status takes no body, got {} lines", body.len()));
        }
        let world = self.world.as_ref().ok_or("world not initialized; send size first")?;
        let state = if world.is_over() { "end" } else { "running" };
        self.send(state, &[self.ticks.to_string()]).map_err(|e| e.to_string())
    }

    fn send(&mut self, cmd: &str, args: &[String]) -> io::Result<()> {
        if args.is_empty() {
            writeln!(self.output, "{cmd}")
        } else {
            writeln!(self.output, "{cmd}:")?;
            for arg in args {
                writeln!(self.output, "{arg}")?;
            }
            Ok(())
        }
    }

    fn read_command(&mut self) -> io::Result<Option<(String, Vec<String>)>> {
        loop {
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            let trimmed = line.trim_end_matches(['\n', '\r']);
            if trimmed.is_empty() {
                continue;
            }
            let lower = trimmed.to_lowercase();
            if let Some(cmd) = lower.strip_suffix(':') {
                let mut body = Vec::new();
                loop {
                    let mut next = String::new();
                    if self.input.read_line(&mut next)? == 0 {
                        break;
                    }
                    let next = next.trim_end_matches(['\n', '\r']).to_string();
                    if next.is_empty() {
                        break;
                    }
                    body.push(next);
                }
                return Ok(Some((cmd.to_string(), body)));
            }
            return Ok(Some((lower, Vec::new())));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run(input: &str) -> String {
        let mut output = Vec::new();
        {
            let mut server = Server::new(Cursor::new(input.as_bytes()), &mut output);
            server.run().unwrap();
        }
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn size_then_status_reports_running() {
        let transcript = run("size:\n5\n5\n\nstatus\nquit\n");
        assert!(transcript.contains("running:"));
        assert!(transcript.contains("0\n"));
    }

    #[test]
    fn tick_without_size_reports_an_error() {
        let transcript = run("tick\nquit\n");
        assert!(transcript.starts_with("error:"));
    }

    #[test]
    fn unknown_command_reports_an_error_and_keeps_running() {
        let transcript = run("bogus\nsize:\n2\n2\n\nstatus\nquit\n");
        assert!(transcript.contains("error: unknown command"));
        assert!(transcript.contains("running:"));
    }
}
