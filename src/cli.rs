//! One-shot commands that print to stdout.

use clap::{Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use futures::StreamExt;
use std::path::PathBuf;
use tracing::info;

use crate::error::MovieError;
use crate::render::{detail_text, movie_line};
use crate::repository::{MovieRepository, MovieStream};
use crate::tmdb::types::Movie;

const TITLE_WIDTH: usize = 60;

#[derive(Parser, Debug)]
#[command(name = "movieshelf")]
#[command(about = "Browse and search TMDB movies from the terminal, with an offline cache")]
#[command(version)]
pub struct Args {
  /// Path to config file (default: ./movieshelf.yaml, then $XDG_CONFIG_HOME/movieshelf/config.yaml)
  #[arg(short, long, global = true)]
  pub config: Option<PathBuf>,

  /// Also write logs to stderr
  #[arg(short, long, global = true)]
  pub verbose: bool,

  #[command(subcommand)]
  pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
  /// Print trending movies, highest rated first
  Trending {
    /// Ignore the cache and fetch from TMDB
    #[arg(short, long)]
    refresh: bool,
    /// Keep printing whenever the cached list changes
    #[arg(short, long)]
    follow: bool,
  },
  /// Search movies by title (requires a connection)
  Search { query: String },
  /// Print details for one movie
  Detail {
    /// TMDB movie id
    id: i64,
    /// Ignore the cache and fetch from TMDB
    #[arg(short, long)]
    refresh: bool,
  },
  /// Interactive terminal browser (default)
  Browse,
}

fn print_movies(movies: &[Movie]) {
  if movies.is_empty() {
    println!("No movies found.");
    return;
  }
  for movie in movies {
    println!("{:>8}  {}", movie.id, movie_line(movie, TITLE_WIDTH));
  }
}

fn to_report(e: MovieError) -> color_eyre::Report {
  eyre!("{} ({} error)", e.message(), e.kind())
}

async fn first<T>(mut stream: MovieStream<T>) -> Result<T> {
  match stream.next().await {
    Some(item) => item.map_err(to_report),
    None => Err(eyre!("No result")),
  }
}

pub async fn trending(repo: &MovieRepository, refresh: bool, follow: bool) -> Result<()> {
  let mut stream = repo.trending(refresh);

  if !follow {
    print_movies(&first(stream).await?);
    return Ok(());
  }

  info!("Following trending movies");
  loop {
    tokio::select! {
      next = stream.next() => match next {
        Some(Ok(movies)) => {
          print_movies(&movies);
          println!();
        }
        Some(Err(e)) => return Err(to_report(e)),
        None => return Ok(()),
      },
      _ = tokio::signal::ctrl_c() => return Ok(()),
    }
  }
}

pub async fn search(repo: &MovieRepository, query: &str) -> Result<()> {
  print_movies(&first(repo.search(query)).await?);
  Ok(())
}

pub async fn detail(repo: &MovieRepository, id: i64, refresh: bool) -> Result<()> {
  print!("{}", detail_text(&first(repo.detail(id, refresh)).await?));
  Ok(())
}
