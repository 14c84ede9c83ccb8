use clap::{App, Arg, ArgMatches};
use image::{imageops, RgbaImage};
use rand::rngs::StdRng;
use rand::SeedableRng;

use std::path::{Path, PathBuf};
use std::str::{self, FromStr};

use maskmelt::segment::{SegmentConfig, TrailingRun};
use maskmelt::{mask, EngineConfig, Error};

#[derive(Clone, Copy)]
pub enum Rotation {
    Zero,
    Quarter,
    Half,
    NegQuarter,
}

impl Rotation {
    fn apply(self, image: RgbaImage) -> RgbaImage {
        match self {
            Rotation::Quarter => imageops::rotate90(&image),
            Rotation::Half => imageops::rotate180(&image),
            Rotation::NegQuarter => imageops::rotate270(&image),
            Rotation::Zero => image,
        }
    }

    fn undo(self, image: RgbaImage) -> RgbaImage {
        match self {
            Rotation::Quarter => imageops::rotate270(&image),
            Rotation::Half => imageops::rotate180(&image),
            Rotation::NegQuarter => imageops::rotate90(&image),
            Rotation::Zero => image,
        }
    }
}

impl str::FromStr for Rotation {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let num = s
            .parse::<isize>()
            .map_err(|e| format!("{:?}", e))?
            .rem_euclid(360);
        match num {
            0 => Ok(Rotation::Zero),
            90 => Ok(Rotation::Quarter),
            180 => Ok(Rotation::Half),
            270 => Ok(Rotation::NegQuarter),
            _ => Err(String::from("rotation angle must be a multiple of 90")),
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let app = App::new("maskmelt")
        .version(clap::crate_version!())
        .about(clap::crate_description!())
        .arg(
            Arg::with_name("input")
                .help("The input image to sort.")
                .required(true)
                .takes_value(true),
        )
        .args(&[
            arg_output(),
            arg_mask(),
            arg_chance(),
            arg_close_trailing(),
            arg_seed(),
            arg_threads(),
            arg_rotation(),
        ]);
    #[cfg(feature = "imageproc")]
    let app = app.args(&[arg_edges(), arg_upper(), arg_lower()]);
    let matches = app.get_matches();
    if let Err(e) = run(&matches) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(matches: &ArgMatches<'_>) -> Result<(), Box<dyn std::error::Error>> {
    let input = Path::new(matches.value_of_os("input").ok_or("missing input")?);
    let output = matches
        .value_of_os("output")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let extension = input
                .extension()
                .and_then(std::ffi::OsStr::to_str)
                .unwrap_or("png");
            input.with_extension(["sorted", ".", extension].concat())
        });
    let rotate = Rotation::from_str(matches.value_of("rotation").unwrap_or("0"))?;

    let segment_config = SegmentConfig {
        split_chance: parse_or(matches, "chance", maskmelt::segment::DEFAULT_SPLIT_CHANCE)?,
        trailing_run: if matches.is_present("close_trailing") {
            TrailingRun::Close
        } else {
            TrailingRun::Drop
        },
    };
    segment_config.validate()?;
    let engine_config = EngineConfig {
        threads: parse_opt(matches, "threads")?,
    };
    let mut rng = match parse_opt::<u64>(matches, "seed")? {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let image = image::open(input).map_err(Error::from)?.to_rgba8();
    log::info!("loaded {} ({}x{})", input.display(), image.width(), image.height());
    let mask = load_mask(matches, &image)?;

    let mut image = rotate.apply(image);
    let mask = rotate.apply(mask);
    maskmelt::melt(&mut image, &mask, &segment_config, &engine_config, &mut rng)?;
    let image = rotate.undo(image);

    image.save(&output).map_err(Error::from)?;
    log::info!("wrote {}", output.display());
    Ok(())
}

fn load_mask(matches: &ArgMatches<'_>, image: &RgbaImage) -> Result<RgbaImage, Box<dyn std::error::Error>> {
    let (width, height) = image.dimensions();
    if let Some(mask_path) = matches.value_of_os("mask").map(Path::new) {
        let mask = image::open(mask_path).map_err(Error::from)?.to_rgba8();
        log::info!("loaded mask {} ({}x{})", mask_path.display(), mask.width(), mask.height());
        return Ok(mask::fit(&mask, width, height));
    }
    #[cfg(feature = "imageproc")]
    {
        if matches.is_present("edges") {
            let lower = parse_or(matches, "lower", 50.0f32)?;
            let upper = parse_or(matches, "upper", 100.0f32)?;
            return Ok(mask::from_edges(image, lower, upper));
        }
    }
    Ok(mask::opaque(width, height))
}

fn parse_opt<T>(matches: &ArgMatches<'_>, name: &str) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    matches
        .value_of(name)
        .map(|value| {
            value
                .parse()
                .map_err(|e| format!("invalid value {:?} for {}: {}", value, name, e))
        })
        .transpose()
}

fn parse_or<T>(matches: &ArgMatches<'_>, name: &str, default: T) -> Result<T, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    Ok(parse_opt(matches, name)?.unwrap_or(default))
}

fn arg_rotation() -> Arg<'static, 'static> {
    Arg::with_name("rotation")
        .short("r")
        .long("rotation")
        .help("The rotation to apply to the image prior sorting.")
        .long_help(
            "The rotation to apply to the image(and mask) prior sorting.\n\
                \n\
                Runs are always sorted left to right along a row of the rotated image, so a\n\
                rotation of 90 or 270 degrees sorts columns instead of rows. May be any multiple of 90 degrees.",
        )
        .default_value("0")
        .takes_value(true)
}

fn arg_chance() -> Arg<'static, 'static> {
    Arg::with_name("chance")
        .short("c")
        .long("chance")
        .help("The chance in [0;1] that a masked pixel splits the run it is part of.")
        .default_value("0.05")
        .takes_value(true)
}

fn arg_close_trailing() -> Arg<'static, 'static> {
    Arg::with_name("close_trailing")
        .long("close-trailing")
        .help("Also sort runs that reach the right edge of the image.")
        .long_help(
            "Also sort runs that reach the right edge of the image.\n\
             \n\
             By default a run is only sorted once a transparent mask pixel or a random split ends it,\n\
             runs still open at the end of a row are left as they are.",
        )
}

fn arg_seed() -> Arg<'static, 'static> {
    Arg::with_name("seed")
        .long("seed")
        .help("Seed for the random run splitting, makes the output reproducible.")
        .takes_value(true)
}

fn arg_threads() -> Arg<'static, 'static> {
    Arg::with_name("threads")
        .short("t")
        .long("threads")
        .help("The maximum number of worker threads, defaults to the number of cores.")
        .takes_value(true)
}

#[cfg(feature = "imageproc")]
fn arg_edges() -> Arg<'static, 'static> {
    Arg::with_name("edges")
        .short("e")
        .long("edges")
        .help("Use the edges of the input image as the mask.")
        .conflicts_with("mask")
}

#[cfg(feature = "imageproc")]
fn arg_upper() -> Arg<'static, 'static> {
    Arg::with_name("upper")
        .short("u")
        .long("upper")
        .help("The upper threshold of the edge detection.")
        .long_help(
            "The upper threshold of the edge detection.\n\
                \n\
                In the range of [0.0;1140.39), accepts floating point numbers.",
        )
        .requires("edges")
        .takes_value(true)
}

#[cfg(feature = "imageproc")]
fn arg_lower() -> Arg<'static, 'static> {
    Arg::with_name("lower")
        .short("l")
        .long("lower")
        .help("The lower threshold of the edge detection.")
        .long_help(
            "The lower threshold of the edge detection.\n\
                \n\
                In the range of [0.0;1140.39), accepts floating point numbers.",
        )
        .requires("edges")
        .takes_value(true)
}

fn arg_mask() -> Arg<'static, 'static> {
    Arg::with_name("mask")
        .short("m")
        .long("mask")
        .help("A file path to an image whose alpha channel masks the input image.")
        .long_help(
            "A file path to an image whose alpha channel masks the input image.\n\
             Pixels with any opacity may be sorted, fully transparent ones may not.\n\
             The mask is scaled to the input image keeping its aspect ratio.\n\
             Without a mask the whole image is eligible.",
        )
        .takes_value(true)
}

fn arg_output() -> Arg<'static, 'static> {
    Arg::with_name("output")
        .short("o")
        .long("output")
        .help("A file path to save the output image to.")
        .takes_value(true)
}
