/*
 * Copyright (c) 2024 Andrew Brower.
 * This file is part of Lurker.
 *
 * Lurker is free software: you can redistribute it and/or
 * modify it under the terms of the GNU Affero General Public
 * License as published by the Free Software Foundation, either
 * version 3 of the License, or (at your option) any later version.
 *
 * Lurker is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU
 * Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public
 * License along with Lurker. If not, see
 * <https://www.gnu.org/licenses/>.
 */

use std::{io::Write, path::Path};

use args::Args;
use auth::AuthClient;
use bot::Bot;
use clap::Parser;
use color_eyre::eyre::{bail, ensure, Result};
use config::AppConfig;
use net::{Connection, ConnectionHandle};
use player::Player;
use sink::{ChatSink, ConsoleSink, FileSink, ReplayReader};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[macro_use]
extern crate tracing;

mod args;
mod auth;
mod bot;
mod chat;
mod config;
mod net;
mod player;
mod protocol;
mod sink;

type Input = Lines<BufReader<Stdin>>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    // RUST_LOG=lurker=trace
    match cfg!(debug_assertions) {
        true => {
            let filter = EnvFilter::from_default_env();
            let fmt = tracing_subscriber::fmt::layer().pretty();
            tracing_subscriber::registry().with(filter).with(fmt).init();
        }
        false => tracing_subscriber::fmt::init(),
    }

    let args = Args::parse();

    if let Some(path) = &args.replay {
        return replay(path);
    }

    let mut input = BufReader::new(tokio::io::stdin()).lines();

    let mut config = AppConfig::load(&args.config)?;
    ensure!(
        !config.players.is_empty(),
        "No players saved in {}",
        args.config.display()
    );

    let index = select_player(&config.players, args.player, &mut input).await?;
    let auth = AuthClient::default();

    if args.logout {
        config.players[index].logout(&auth).await?;
        config.save(&args.config)?;
        println!("Logged out.");
        return Ok(());
    }

    let player = &mut config.players[index];
    let token = match args.offline {
        true => player.offline_token(),
        false => player.login(&auth).await?,
    };
    println!("Logged in as {}...", token.profile.name);

    config.save(&args.config)?;
    println!("Saved player data.");

    let mut sinks: Vec<Box<dyn ChatSink + Send>> = vec![Box::new(ConsoleSink::stdout())];
    if let Some(path) = &args.record {
        sinks.push(Box::new(FileSink::open(path)?));
    }

    let address = args.address(&config.server.address);
    let port = args.port(config.server.port);

    let mut connection = Connection::new(&address, port, token.profile.name);
    Bot::new(sinks).attach(&mut connection);

    info!("Connecting to {address}:{port}");
    let handle = connection.connect().await?;

    run(handle, &mut input).await
}

fn replay(path: &Path) -> Result<()> {
    let mut reader = ReplayReader::read_file(path)?;
    info!("Replaying {} messages from {}", reader.remaining(), path.display());

    Bot::new(vec![Box::new(ConsoleSink::stdout())]).attach(&mut reader);
    while reader.dispatch()? {}

    Ok(())
}

fn prompt() {
    print!("> ");
    if let Err(why) = std::io::stdout().flush() {
        warn!("Failed to flush prompt: {why}");
    }
}

async fn select_player(
    players: &[Player],
    requested: Option<usize>,
    input: &mut Input,
) -> Result<usize> {
    if let Some(index) = requested {
        ensure!(
            index < players.len(),
            "There's no player {index}, only {} saved",
            players.len()
        );
        return Ok(index);
    }

    if players.len() == 1 {
        return Ok(0);
    }

    println!("Please choose one of the following users:");
    for (i, player) in players.iter().enumerate() {
        println!("{i}: {} ({})", player.display_name(), player.username);
    }

    loop {
        prompt();
        let Some(line) = input.next_line().await? else {
            bail!("No player chosen");
        };

        match line.trim().parse::<usize>() {
            Ok(index) if index < players.len() => return Ok(index),
            _ => println!("Enter a number from 0 to {}", players.len() - 1),
        }
    }
}

enum Event {
    Line(Option<String>),
    Closed(Result<()>),
}

async fn run(mut handle: ConnectionHandle, input: &mut Input) -> Result<()> {
    loop {
        prompt();

        let event = tokio::select! {
            line = input.next_line() => Event::Line(line?),
            result = handle.closed() => Event::Closed(result),
        };

        match event {
            Event::Line(Some(line)) => {
                if let Some(packet) = bot::process_input(line.trim_end()) {
                    handle.write_packet(packet)?;
                }
            }
            Event::Line(None) => {
                println!("Bye!");
                handle.close();
                return Ok(());
            }
            Event::Closed(result) => return result,
        }
    }
}
