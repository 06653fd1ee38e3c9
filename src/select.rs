//!
//! src/select.rs  Andrew Belles  Oct 16th, 2026
//!
//! Interactive, paginated picker over search results
//!
//!

use std::io::{BufRead, Write};

use tracing::warn;

use crate::errors::MixError;
use crate::fetch::TrackSearch;
use crate::types::TrackStub;

/// Prints `prompt`, reads one trimmed line. None on EOF.
pub fn prompt_line<R: BufRead, W: Write>(prompt: &str, input: &mut R, out: &mut W) ->
    Result<Option<String>, MixError> {
    write!(out, "{prompt}")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok( Some(line.trim().to_string()) )
}

enum Command {
    Quit,
    Next,
    Prev,
    Pick(usize)
}

fn parse_command<W: Write>(choice: &str, shown: usize, out: &mut W) -> Result<Command, MixError> {
    let command = match choice {
        "q" => Command::Quit,
        "n" => Command::Next,
        "p" => Command::Prev,
        "" => Command::Pick(0),
        other => match other.parse::<usize>() {
            Ok(n) if (1..=shown).contains(&n) => Command::Pick(n - 1),
            Ok(_) => {
                writeln!(out, "Choice out of range, defaulting to 1.")?;
                Command::Pick(0)
            },
            Err(_) => {
                writeln!(out, "Invalid input, defaulting to 1.")?;
                Command::Pick(0)
            }
        }
    };
    Ok(command)
}

/// Shows pages of `page_size` results until the user picks one. None when
/// the user quits, input ends, nothing is found or the search fails.
pub async fn choose_track_paginated<S, R, W>(
    search: &S,
    query: &str,
    page_size: u32,
    input: &mut R,
    out: &mut W
) -> Result<Option<TrackStub>, MixError>
where
    S: TrackSearch + ?Sized,
    R: BufRead,
    W: Write
{
    let page_size = page_size.max(1);
    let mut offset: u32 = 0;

    loop {
        let page = match search.search(query, page_size, offset).await {
            Ok(page) => page,
            Err(e) => {
                warn!(error = %e, query, offset, "select.search.failed");
                writeln!(out, "Failed to search Spotify: {e}")?;
                return Ok(None);
            }
        };
        if page.items.is_empty() {
            if offset == 0 {
                writeln!(out, "No tracks found on Spotify for that search.")?;
            } else {
                writeln!(out, "No tracks on this page.")?;
            }
            return Ok(None);
        }

        let shown = page.items.len();
        writeln!(
            out,
            "\nSelect a track (showing {}-{} of {}):",
            offset + 1,
            offset as usize + shown,
            page.total
        )?;
        for (idx, track) in page.items.iter().enumerate() {
            writeln!(out, "{}. {} — {}", idx + 1, track.display_name(), track.artist_names())?;
        }
        writeln!(
            out,
            "Commands: number to select | n = next page | p = prev page | q = quit | Enter = select 1"
        )?;

        let Some(choice) = prompt_line("Your choice: ", input, out)? else {
            return Ok(None);
        };

        match parse_command(&choice.to_lowercase(), shown, out)? {
            Command::Quit => return Ok(None),
            Command::Next => {
                if offset + page_size >= page.total {
                    writeln!(out, "Already at the last page.")?;
                } else {
                    offset += page_size;
                }
            },
            Command::Prev => {
                if offset == 0 {
                    writeln!(out, "Already at the first page.")?;
                } else {
                    offset = offset.saturating_sub(page_size);
                }
            },
            Command::Pick(idx) => {
                return Ok(page.items.into_iter().nth(idx));
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::io::Cursor;
    use std::sync::Mutex;

    use crate::types::{ArtistStub, SearchPage};

    /// In-memory search over `total` numbered tracks, records offsets asked
    pub(crate) struct FakeSearch {
        pub total: u32,
        pub fail: bool,
        pub offsets: Mutex<Vec<u32>>
    }

    impl FakeSearch {
        pub(crate) fn with_total(total: u32) -> Self {
            Self { total, fail: false, offsets: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl TrackSearch for FakeSearch {
        async fn search(&self, _query: &str, limit: u32, offset: u32) ->
            Result<SearchPage, MixError> {
            self.offsets.lock().unwrap().push(offset);
            if self.fail {
                return Err(MixError::Http("status 500".to_string()));
            }
            let items = (offset..self.total.min(offset + limit))
                .map(|i| TrackStub {
                    id: Some(format!("id{i}")),
                    name: Some(format!("Track {i}")),
                    artists: vec![ArtistStub { name: format!("Artist {i}") }]
                })
                .collect();
            Ok( SearchPage { items, total: self.total } )
        }
    }

    async fn pick(search: &FakeSearch, keys: &str) -> (Option<TrackStub>, String) {
        let mut input = Cursor::new(keys.as_bytes().to_vec());
        let mut out = Vec::new();
        let picked = choose_track_paginated(search, "query", 5, &mut input, &mut out)
            .await
            .unwrap();
        (picked, String::from_utf8(out).unwrap())
    }

    fn picked_id(picked: &Option<TrackStub>) -> Option<&str> {
        picked.as_ref().and_then(|t| t.id.as_deref())
    }

    #[tokio::test]
    async fn enter_selects_first() {
        let search = FakeSearch::with_total(12);
        let (picked, out) = pick(&search, "\n").await;
        assert_eq!(picked_id(&picked), Some("id0"));
        assert!(out.contains("showing 1-5 of 12"));
        assert!(out.contains("1. Track 0 — Artist 0"));
    }

    #[tokio::test]
    async fn number_selects_on_current_page() {
        let search = FakeSearch::with_total(12);
        let (picked, _) = pick(&search, "n\n3\n").await;
        assert_eq!(picked_id(&picked), Some("id7"));
        assert_eq!(*search.offsets.lock().unwrap(), vec![0, 5]);
    }

    #[tokio::test]
    async fn paging_stops_at_both_ends() {
        let search = FakeSearch::with_total(7);
        let (picked, out) = pick(&search, "p\nn\nn\n2\n").await;
        assert!(out.contains("Already at the first page."));
        assert!(out.contains("Already at the last page."));
        assert!(out.contains("showing 6-7 of 7"));
        assert_eq!(picked_id(&picked), Some("id6"));
    }

    #[tokio::test]
    async fn bad_input_defaults_to_first() {
        let search = FakeSearch::with_total(3);
        let (picked, out) = pick(&search, "9\n").await;
        assert!(out.contains("Choice out of range, defaulting to 1."));
        assert_eq!(picked_id(&picked), Some("id0"));

        let (picked, out) = pick(&search, "abc\n").await;
        assert!(out.contains("Invalid input, defaulting to 1."));
        assert_eq!(picked_id(&picked), Some("id0"));
    }

    #[tokio::test]
    async fn quit_eof_and_empty_results_return_none() {
        let search = FakeSearch::with_total(3);
        assert_eq!(pick(&search, "Q\n").await.0, None);
        assert_eq!(pick(&search, "").await.0, None);

        let empty = FakeSearch::with_total(0);
        let (picked, out) = pick(&empty, "\n").await;
        assert_eq!(picked, None);
        assert!(out.contains("No tracks found on Spotify for that search."));
    }

    #[tokio::test]
    async fn search_failure_is_reported_not_raised() {
        let search = FakeSearch { fail: true, ..FakeSearch::with_total(3) };
        let (picked, out) = pick(&search, "\n").await;
        assert_eq!(picked, None);
        assert!(out.contains("Failed to search Spotify"));
    }
}
