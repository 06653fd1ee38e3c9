//!
//! src/main.rs  Andrew Belles  Oct 16th, 2026
//!
//! Entry point of the mix sequencer: search Spotify for a seed, chain
//! harmonic/tempo ordered mixes from its related tracks, and save the
//! resulting playlist
//!
//!

mod config;
mod errors;
mod logging;

mod types;
mod camelot;
mod tempo;
mod vibe;
mod sequence;
mod trends;

mod assemble;
mod fetch;
mod select;
mod format;
mod export;
mod session;

use std::io::{self, BufRead, Write};

use crate::errors::MixError;
use crate::export::{random_mix_title, PlaylistSink};
use crate::fetch::{SpotifyClient, TunebatClient};
use crate::select::{choose_track_paginated, prompt_line};
use crate::session::MixSession;

async fn run<R: BufRead, W: Write>(
    cfgs: &config::AppConfig,
    input: &mut R,
    out: &mut W
) -> Result<(), MixError> {
    let query = prompt_line("Enter a song/artist to search on Spotify: ", input, out)?
        .unwrap_or_default();
    if query.is_empty() {
        writeln!(out, "No search term provided.")?;
        return Ok(());
    }

    let spotify = match SpotifyClient::new(&cfgs.http, &cfgs.spotify)?.authorize().await {
        Ok(search) => search,
        Err(e) => {
            tracing::error!(error = %e, "spotify.token.failed");
            writeln!(out, "Failed to fetch Spotify token: {e}")?;
            return Ok(());
        }
    };

    let Some(picked) = choose_track_paginated(
        &spotify, &query, cfgs.mix.page_size, input, out
    ).await? else {
        return Ok(());
    };

    let tunebat = TunebatClient::new(&cfgs.http, &cfgs.tunebat)?;
    let session = MixSession::new(&tunebat, &cfgs.mix);
    let report = session.run(&picked, input, out).await?;

    tracing::info!(rounds = report.rounds, tracks = report.urls.len(), "session.done");
    if report.urls.is_empty() {
        return Ok(());
    }

    let title = random_mix_title(cfgs.mix.title_words, &mut rand::thread_rng());
    let sink = PlaylistSink::new(&cfgs.mix.output_dir);
    let path = sink.write_playlist(&title, &report.urls, &chrono::Local::now())?;
    writeln!(out, "\nSaved playlist to {}", path.display())?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), MixError> {
    let cfgs = config::load_config()?;
    let _guard = logging::init_logging(&cfgs.logging)?;

    tracing::info!(
        service = "mixrr",
        version = %env!("CARGO_PKG_VERSION"),
        "starting"
    );

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();
    run(&cfgs, &mut input, &mut out).await
}
