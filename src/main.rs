// main.rs      gifmodel command
//
// Copyright (c) 2019-2025  Douglas Lau
//
#![forbid(unsafe_code)]

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use gifmodel::block::DisposalMethod;
use gifmodel::{Decoder, Gif, Image};
use std::error::Error;
use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufReader, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Crate version
const VERSION: &'static str = std::env!("CARGO_PKG_VERSION");

/// Main entry point
fn main() -> Result<(), Box<dyn Error>> {
    env_logger::builder().format_timestamp(None).init();
    let mut out = StandardStream::stdout(ColorChoice::Always);
    match create_app().get_matches().subcommand() {
        ("show", Some(matches)) => show(&mut out, matches)?,
        _ => unreachable!(),
    }
    out.reset()?;
    Ok(())
}

/// Create clap App
fn create_app() -> App<'static, 'static> {
    App::new("gifmodel")
        .version(VERSION)
        .setting(AppSettings::GlobalVersion)
        .about("GIF decoding utility")
        .setting(AppSettings::ArgRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("show")
                .about("Show decoded GIF model")
                .arg(
                    Arg::with_name("files")
                        .required(true)
                        .min_values(1)
                        .help("input file(s)"),
                ),
        )
}

/// Handle show subcommand
fn show(
    out: &mut StandardStream,
    matches: &ArgMatches,
) -> Result<(), Box<dyn Error>> {
    if let Some(values) = matches.values_of_os("files") {
        for path in values {
            show_file(out, path)?;
        }
    }
    Ok(())
}

/// Show one GIF file
fn show_file(
    out: &mut StandardStream,
    path: &OsStr,
) -> Result<(), Box<dyn Error>> {
    let mut magenta = ColorSpec::new();
    magenta.set_fg(Some(Color::Magenta));
    let mut red = ColorSpec::new();
    red.set_fg(Some(Color::Red)).set_intense(true);
    let mut yellow = ColorSpec::new();
    yellow.set_fg(Some(Color::Yellow)).set_intense(true);
    let mut cyan = ColorSpec::new();
    cyan.set_fg(Some(Color::Cyan)).set_intense(true);
    let mut bold = ColorSpec::new();
    bold.set_fg(Some(Color::White))
        .set_intense(true)
        .set_bold(true);
    out.set_color(&magenta)?;
    writeln!(out, "{}", path.to_string_lossy())?;
    let f = BufReader::new(File::open(path)?);
    let gif = match Decoder::new(f).decode() {
        Ok(gif) => gif,
        Err(e) => {
            out.set_color(&red)?;
            writeln!(out, "error: {} ({:?})", e, e.kind())?;
            return Ok(());
        }
    };
    let image_digits = digits(gif.images().len()).max(3);
    let width = gif.screen_width();
    let height = gif.screen_height();
    let size_digits = 4.max(1 + digits(width) + digits(height));
    let version = String::from_utf8_lossy(&gif.version()).to_string();
    out.set_color(&bold)?;
    write!(out, "GIF{}, {}x{}", version, width, height)?;
    write!(out, ", images: {}", gif.images().len())?;
    if let Some(c) = gif.loop_count() {
        write!(out, ", repeat: ")?;
        if c == 0 {
            write!(out, "∞")?;
        } else {
            write!(out, "{}", c)?;
        }
    }
    writeln!(out)?;
    let mut comments = vec![];
    for cmt in gif.comments().iter().rev() {
        for l in cmt.text().split('\n') {
            let l = l.trim();
            if !l.is_empty() {
                comments.push(l.to_string());
            }
        }
    }
    out.set_color(&cyan)?;
    for c in comments {
        writeln!(out, "  # {}", c)?;
    }
    for app in gif.applications().iter().rev() {
        let id = String::from_utf8_lossy(app.app_id()).to_string();
        let auth = String::from_utf8_lossy(app.auth_code()).to_string();
        writeln!(out, "  @ {}{} ({} bytes)", id, auth, app.data().len())?;
    }
    out.set_color(&yellow)?;
    write!(out, " {:>w$}", "Im#", w = image_digits)?;
    write!(out, "  Delay Disp")?;
    write!(out, " {:>w$}", "Size", w = size_digits)?;
    write!(out, " {:>w$}", "X,Y", w = size_digits)?;
    writeln!(out, " Clrs Trn")?;
    for (n, image) in gif.images().iter().enumerate() {
        write_image(out, &gif, image, n, image_digits, size_digits)?;
    }
    Ok(())
}

/// Write one image row
fn write_image(
    out: &mut StandardStream,
    gif: &Gif,
    image: &Image,
    number: usize,
    image_digits: usize,
    size_digits: usize,
) -> Result<(), Box<dyn Error>> {
    let mut dflt = ColorSpec::new();
    dflt.set_fg(Some(Color::White));
    let mut bold = ColorSpec::new();
    bold.set_fg(Some(Color::White))
        .set_intense(true)
        .set_bold(true);
    let mut red = ColorSpec::new();
    red.set_fg(Some(Color::Red)).set_intense(true);
    out.set_color(&dflt)?;
    write!(out, "{}", if image.interlaced() { 'i' } else { ' ' })?;
    out.set_color(&bold)?;
    write!(out, "{:>w$}", number, w = image_digits)?;
    let d = image.delay_time_cs();
    if d == 0 {
        out.set_color(&dflt)?;
    }
    write!(out, " {:6.2}", d as f32 / 100f32)?;
    let d = match image.graphic_control() {
        Some(_) => match image.disposal_method() {
            DisposalMethod::NoAction => "none",
            DisposalMethod::Keep => "keep",
            DisposalMethod::Background => "bg",
            DisposalMethod::Previous => "prev",
            DisposalMethod::Reserved(_) => "res",
        },
        None => "-",
    };
    out.set_color(match d {
        "none" | "-" => &dflt,
        "res" => &red,
        _ => &bold,
    })?;
    write!(out, " {:>4}", d)?;
    if gif.screen_width() == image.width()
        && gif.screen_height() == image.height()
    {
        out.set_color(&dflt)?;
    } else {
        out.set_color(&bold)?;
    }
    write!(
        out,
        " {:>w$}",
        &format!("{}x{}", image.width(), image.height()),
        w = size_digits
    )?;
    if image.left() == 0 && image.top() == 0 {
        out.set_color(&dflt)?;
    } else {
        out.set_color(&bold)?;
    }
    write!(
        out,
        " {:>w$}",
        &format!("{},{}", image.left(), image.top()),
        w = size_digits
    )?;
    match image.local_color_table() {
        Some(t) => {
            out.set_color(&bold)?;
            write!(out, "  {:3}", t.len())?;
        }
        None => {
            out.set_color(&dflt)?;
            let g = gif.global_color_table().map_or(0, |t| t.len());
            write!(out, " {:3}g", g)?;
        }
    }
    match image.transparent_color() {
        Some(tc) => {
            out.set_color(&bold)?;
            writeln!(out, " {:>3}", tc)?;
        }
        None => {
            out.set_color(&dflt)?;
            writeln!(out, " {:>3}", "-")?;
        }
    }
    Ok(())
}

/// Get the number of decimal digits in a value
fn digits<T: Into<usize>>(v: T) -> usize {
    let v = v.into();
    match v {
        0..=9 => 1,
        10..=99 => 2,
        100..=999 => 3,
        1000..=9999 => 4,
        _ => 5,
    }
}
