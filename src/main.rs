use anyhow::Context;
use clap::{value_parser, Arg, ArgMatches, Command};
use rand::rngs::StdRng;
use rand::SeedableRng;

use std::path::{Path, PathBuf};

use pixelsort::interval::IntervalMode;
use pixelsort::ledger::{self, Entry};
use pixelsort::params::{Preset, RunParameters};
use pixelsort::sorting::SortKey;
use pixelsort::{backend, pipeline, source};

const RANDOM_SELECT: &str = "random-select";

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = Command::new("pixelsort")
        .version(clap::crate_version!())
        .author(clap::crate_authors!())
        .about("Pixel sorts an image along intervals found by one of several interval functions.")
        .arg(
            Arg::new("input")
                .help("The input image to sort. Falls back to the default image if unreadable."),
        )
        .args([
            arg_interval(),
            arg_sorting(),
            arg_output(),
            arg_preset(),
            arg_lower(),
            arg_upper(),
            arg_clength(),
            arg_angle(),
            arg_randomness(),
            arg_ledger(),
            arg_seed(),
        ])
        .get_matches();

    let mut rng = match matches.get_one::<u64>("seed") {
        Some(&seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let input = matches.get_one::<String>("input").map_or("", String::as_str);
    let source = source::load(input).context("failed to read input image")?;
    let (width, height) = source.image.dimensions();
    if source.used_fallback {
        log::warn!("using default image {}", source.locator);
    } else {
        log::info!("using given image {}", source.locator);
    }
    log::info!("resolution: {}x{}", width, height);

    let mut params = parameters(&matches, source.locator.clone());
    let (mut mode, mut mode_randomized) = match value(&matches, "interval_func") {
        RANDOM_SELECT => (IntervalMode::choose(&mut rng), true),
        name => (IntervalMode::from_name_lenient(name), false),
    };
    let mut sort_randomized = match value(&matches, "sorting") {
        RANDOM_SELECT => {
            params.sort_key = SortKey::choose(&mut rng);
            true
        }
        name => {
            params.sort_key = SortKey::from_name_lenient(name);
            false
        }
    };

    // presets take over the arguments they set
    let preset = matches
        .get_one::<String>("preset")
        .and_then(|name| Preset::from_name_lenient(name));
    if let Some(preset) = preset {
        let choice = preset.resolve(&mut rng);
        choice.apply(&mut params);
        mode = choice.mode;
        mode_randomized = choice.mode_randomized;
        sort_randomized = choice.sort_randomized;
        log::info!("preset: {}", preset);
    } else {
        log::info!("no preset applied");
    }

    log_summary(&params, mode, mode_randomized, sort_randomized);

    let output = matches
        .get_one::<PathBuf>("output")
        .cloned()
        .unwrap_or_else(|| default_output(Path::new(&source.locator)));

    let sorted = pipeline::pixelsort(&source.image, mode, &params, &mut rng)
        .with_context(|| format!("interval function `{}` failed", mode))?;
    backend::save(&sorted, &output)
        .with_context(|| format!("failed to save {}", output.display()))?;
    log::info!("saved sorted image to {}", output.display());

    if let Some(path) = matches.get_one::<PathBuf>("ledger") {
        let mut entry = Entry::now(&params, mode, &output);
        entry.resolution = (width, height);
        entry.preset = preset;
        entry.mode_randomized = mode_randomized;
        entry.sort_randomized = sort_randomized;
        ledger::append(path, &entry)
            .with_context(|| format!("failed to write ledger {}", path.display()))?;
        log::info!("saved run to {}", path.display());
    }
    Ok(())
}

fn value<'m>(matches: &'m ArgMatches, id: &str) -> &'m str {
    matches.get_one::<String>(id).map_or("", String::as_str)
}

fn parameters(matches: &ArgMatches, source: String) -> RunParameters {
    let defaults = RunParameters::default();
    RunParameters {
        bottom_threshold: matches
            .get_one::<f64>("lower")
            .copied()
            .unwrap_or(defaults.bottom_threshold),
        upper_threshold: matches
            .get_one::<f64>("upper")
            .copied()
            .unwrap_or(defaults.upper_threshold),
        characteristic_length: matches
            .get_one::<usize>("clength")
            .copied()
            .unwrap_or(defaults.characteristic_length),
        angle: matches.get_one::<f32>("angle").copied().unwrap_or(defaults.angle),
        randomness: matches
            .get_one::<f64>("randomness")
            .copied()
            .unwrap_or(defaults.randomness),
        source,
        ..defaults
    }
}

fn log_summary(params: &RunParameters, mode: IntervalMode, mode_rand: bool, sort_rand: bool) {
    let chosen = |randomized| if randomized { " (randomly selected)" } else { "" };
    log::info!("interval function{}: {}", chosen(mode_rand), mode);
    log::info!("sorting function{}: {}", chosen(sort_rand), params.sort_key);
    match mode {
        IntervalMode::Threshold => {
            log::info!("lower threshold: {}", params.bottom_threshold);
            log::info!("upper threshold: {}", params.upper_threshold);
        }
        IntervalMode::Edges | IntervalMode::FileEdges | IntervalMode::File | IntervalMode::Snap => {
            log::info!("lower threshold: {}", params.bottom_threshold)
        }
        IntervalMode::Random | IntervalMode::Waves => {
            log::info!("characteristic length: {}", params.characteristic_length)
        }
        IntervalMode::ShuffleTotal | IntervalMode::ShuffleAxis | IntervalMode::None => (),
    }
    log::info!("randomness: {} %", params.randomness);
    log::info!("angle: {} degrees", params.angle);
}

fn default_output(input: &Path) -> PathBuf {
    // the alpha channel rules out lossy formats, so the sorted copy is always a png
    input.with_extension("sorted.png")
}

fn arg_interval() -> Arg {
    Arg::new("interval_func")
        .short('i')
        .long("interval")
        .help("Interval function used to separate the image into intervals.")
        .long_help(
            "Interval function used to separate the image into intervals.\n\
             \n\
             One of random, threshold, edges, waves, snap, file, file-edges, shuffle-total,\n\
             shuffle-axis, none or random-select. Unknown names fall back to random.",
        )
        .default_value("random")
}

fn arg_sorting() -> Arg {
    Arg::new("sorting")
        .short('s')
        .long("sorting")
        .help("The function to use for sorting pixels.")
        .long_help(
            "The function to use for sorting pixels.\n\
             \n\
             One of lightness, hue, intensity, minimum, saturation or random-select.\n\
             Unknown names fall back to lightness.",
        )
        .default_value("lightness")
}

fn arg_output() -> Arg {
    Arg::new("output")
        .short('o')
        .long("output")
        .help("A file path to save the output image to.")
        .value_parser(value_parser!(PathBuf))
}

fn arg_preset() -> Arg {
    Arg::new("preset")
        .short('p')
        .long("preset")
        .help("Apply a preset, overriding the arguments it sets.")
        .long_help(
            "Apply a preset, overriding the arguments it sets.\n\
             \n\
             1|main        -- r 50, c 250, a 45, random, intensity\n\
             2|main file   -- r 50, t 0.65, file, random sorting function\n\
             3|full random -- randomness in every argument\n\
             4|snap-sort   -- r 50, c 250, a 45, snap, intensity",
        )
}

fn arg_lower() -> Arg {
    Arg::new("lower")
        .short('t')
        .long("bottom-threshold")
        .help("How dark a pixel must be to be considered a border, between 0 and 1.")
        .long_help(
            "How dark a pixel must be to be considered a border, between 0 and 1.\n\
             \n\
             Used by threshold, edges, file, file-edges and snap.",
        )
        .value_parser(value_parser!(f64))
        .default_value("0.25")
}

fn arg_upper() -> Arg {
    Arg::new("upper")
        .short('u')
        .long("upper-threshold")
        .help("How bright a pixel must be to be considered a border, between 0 and 1.")
        .long_help(
            "How bright a pixel must be to be considered a border, between 0 and 1.\n\
             \n\
             Used by threshold.",
        )
        .value_parser(value_parser!(f64))
        .default_value("0.8")
}

fn arg_clength() -> Arg {
    Arg::new("clength")
        .short('c')
        .long("clength")
        .help("Characteristic length of random intervals.")
        .long_help(
            "Characteristic length of random intervals.\n\
             \n\
             Used by random, waves and snap.",
        )
        .value_parser(value_parser!(usize))
        .default_value("50")
}

fn arg_angle() -> Arg {
    Arg::new("angle")
        .short('a')
        .long("angle")
        .help("Angle at which to sort pixels, in degrees.")
        .long_help(
            "Angle at which to sort pixels, in degrees.\n\
             \n\
             The image is rotated counter-clockwise by this angle before sorting and turned back\n\
             afterwards. 0 sorts horizontally.",
        )
        .value_parser(value_parser!(f32))
        .allow_negative_numbers(true)
        .default_value("0")
}

fn arg_randomness() -> Arg {
    Arg::new("randomness")
        .short('r')
        .long("randomness")
        .help("What percentage of intervals not to sort.")
        .value_parser(value_parser!(f64))
        .default_value("15")
}

fn arg_ledger() -> Arg {
    Arg::new("ledger")
        .long("ledger")
        .help("Append a record of this run to the given text file.")
        .value_parser(value_parser!(PathBuf))
}

fn arg_seed() -> Arg {
    Arg::new("seed")
        .long("seed")
        .help("Seed for the random number generator, for reproducible runs.")
        .value_parser(value_parser!(u64))
}
