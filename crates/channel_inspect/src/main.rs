use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use model::Rect;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use store::{ChannelHeader, load_body, read_header};
use tiles::{PixelAccessError, TiledChannelBuffer};

#[derive(Parser)]
#[command(author, version, about = "Inspect saved channel buffers")]
struct Arguments {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the channel header.
    Info {
        path: PathBuf,
        /// Print the header as JSON.
        #[arg(long)]
        json: bool,
    },
    /// List every tile with its rectangle and byte statistics.
    DumpTiles { path: PathBuf },
    /// Print the value of one pixel.
    #[command(allow_negative_numbers = true)]
    Sample { path: PathBuf, x: i32, y: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct TileStats {
    min: u8,
    max: u8,
    mean: f64,
}

impl TileStats {
    fn of(bytes: &[u8]) -> Option<Self> {
        let first = *bytes.first()?;
        let mut min = first;
        let mut max = first;
        let mut sum = 0u64;
        for &byte in bytes {
            min = min.min(byte);
            max = max.max(byte);
            sum += u64::from(byte);
        }
        Some(Self {
            min,
            max,
            mean: sum as f64 / bytes.len() as f64,
        })
    }
}

/// Tile-size independent view of a loaded channel.
trait LoadedChannel {
    fn tile_reports(&self) -> Vec<(usize, Rect, Option<TileStats>)>;
    fn sample(&self, x: i32, y: i32) -> Result<u8, PixelAccessError>;
    fn default_fill(&self) -> u8;
}

impl<const TILE_SIZE: u32> LoadedChannel for TiledChannelBuffer<TILE_SIZE> {
    fn tile_reports(&self) -> Vec<(usize, Rect, Option<TileStats>)> {
        self.tiles()
            .map(|(index, rect, bytes)| (index, rect, TileStats::of(bytes)))
            .collect()
    }

    fn sample(&self, x: i32, y: i32) -> Result<u8, PixelAccessError> {
        self.try_get(x, y)
    }

    fn default_fill(&self) -> u8 {
        TiledChannelBuffer::<TILE_SIZE>::default_fill(self)
    }
}

fn load_any(header: &ChannelHeader, reader: &mut dyn Read) -> Result<Box<dyn LoadedChannel>> {
    let channel: Box<dyn LoadedChannel> = match header.tile_size {
        4 => Box::new(load_body::<4>(header, reader)?),
        16 => Box::new(load_body::<16>(header, reader)?),
        32 => Box::new(load_body::<32>(header, reader)?),
        64 => Box::new(load_body::<64>(header, reader)?),
        128 => Box::new(load_body::<128>(header, reader)?),
        256 => Box::new(load_body::<256>(header, reader)?),
        other => return Err(anyhow::anyhow!("unsupported tile size {other}")),
    };
    Ok(channel)
}

fn open_channel(path: &Path) -> Result<(ChannelHeader, BufReader<File>)> {
    let file = File::open(path).with_context(|| format!("open channel file {}", path.display()))?;
    let mut reader = BufReader::new(file);
    let header = read_header(&mut reader)
        .with_context(|| format!("read channel header from {}", path.display()))?;
    Ok((header, reader))
}

fn format_rect(rect: Rect) -> String {
    format!("{}x{} at ({}, {})", rect.width, rect.height, rect.x, rect.y)
}

fn print_info(header: &ChannelHeader, json: bool) -> Result<()> {
    if json {
        let text = serde_json::to_string_pretty(header).context("serialize channel header")?;
        println!("{text}");
        return Ok(());
    }
    println!("version:      {}", header.version);
    println!("kind:         {:?}", header.kind);
    println!("default fill: {}", header.default_fill);
    println!("tile size:    {}", header.tile_size);
    println!(
        "tile grid:    {}x{} tiles from ({}, {})",
        header.x_tile_count, header.y_tile_count, header.tile_origin_x, header.tile_origin_y
    );
    println!("image rect:   {}", format_rect(header.image_rect));
    match header.stream_len() {
        Some(len) => println!("stream bytes: {len}"),
        None => println!("stream bytes: overflows usize"),
    }
    Ok(())
}

fn main() -> Result<()> {
    let arguments = Arguments::parse();
    match arguments.command {
        Command::Info { path, json } => {
            let (header, _) = open_channel(&path)?;
            print_info(&header, json)
        }
        Command::DumpTiles { path } => {
            let (header, mut reader) = open_channel(&path)?;
            let channel = load_any(&header, &mut reader)
                .with_context(|| format!("load channel {}", path.display()))?;
            for (index, rect, stats) in channel.tile_reports() {
                match stats {
                    Some(stats) => println!(
                        "tile {index:>5}  {:<24} min {:>3}  max {:>3}  mean {:>7.2}",
                        format_rect(rect),
                        stats.min,
                        stats.max,
                        stats.mean
                    ),
                    None => println!("tile {index:>5}  {}", format_rect(rect)),
                }
            }
            Ok(())
        }
        Command::Sample { path, x, y } => {
            let (header, mut reader) = open_channel(&path)?;
            let channel = load_any(&header, &mut reader)
                .with_context(|| format!("load channel {}", path.display()))?;
            match channel.sample(x, y) {
                Ok(value) => println!("({x}, {y}) = {value}"),
                Err(error) => println!("({x}, {y}) = {} ({error})", channel.default_fill()),
            }
            Ok(())
        }
    }
}
