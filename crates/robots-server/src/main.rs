//! Entry point: standalone mode (`robots-server [--debug] <w> <h>
//! <program>...`) runs one match to completion and exits; with no
//! arguments it instead speaks the line protocol over stdin/stdout.

use std::io::Write;
use std::process;

use robots_core::world::World;
use robots_server::Server;

fn main() {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let debug = if let Some(pos) = args.iter().position(|a| a == "--debug") {
        args.remove(pos);
        true
    } else {
        false
    };

    if args.is_empty() {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        let mut server = Server::new(stdin.lock(), stdout.lock());
        if let Err(e) = server.run() {
            eprintln!("server error: {e}");
            process::exit(1);
        }
    } else {
        run_standalone(&args, debug);
    }
}

fn run_standalone(args: &[String], debug: bool) {
    if args.len() < 2 {
        eprintln!("usage: robots-server [--debug] <width> <height> <program-path>...");
        process::exit(1);
    }
    let width: u32 = args[0].parse().unwrap_or_else(|_| {
        eprintln!("invalid width: {}", args[0]);
        process::exit(1);
    });
    let height: u32 = args[1].parse().unwrap_or_else(|_| {
        eprintln!("invalid height: {}", args[1]);
        process::exit(1);
    });

    let mut world = World::new(width, height);
    world.set_debug(debug);

    for (idx, path) in args[2..].iter().enumerate() {
        let team = (idx + 1) as u32;
        let source = std::fs::read_to_string(path).unwrap_or_else(|e| {
            eprintln!("cannot read {path}: {e}");
            process::exit(1);
        });
        let program = robots_asm::parse(&source).unwrap_or_else(|e| {
            eprintln!("{path}: {e}");
            process::exit(1);
        });
        if world.spawn_random(team, program).is_err() {
            eprintln!("cannot place robot from {path}: world is full");
            process::exit(1);
        }
    }

    while !world.is_over() {
        if debug {
            for robot in world.robots() {
                println!("{}", robot.debug_dump());
            }
        }
        world.tick();
    }

    if debug {
        for robot in world.dead() {
            if let Some(weapon) = &robot.murder_weapon_long {
                println!("#{} died: {weapon}", robot.id);
            }
        }
    }
    let _ = std::io::stdout().flush();
}
