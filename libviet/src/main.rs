//! Line-based converter for trying the engine from a terminal.
//!
//! Each stdin line is typed through the [`Ime`] as an independent
//! session and the converted line is printed.

use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use libviet::{Encoding, Ime, InputStyle, VietConfig};

#[derive(Parser, Debug)]
#[command(
    name = "libviet",
    about = "Vietnamese input method: type Telex or VNI, read Vietnamese"
)]
struct Args {
    /// Configuration file (TOML). Flags below override its fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Input style.
    #[arg(long, value_enum)]
    style: Option<StyleArg>,

    /// Output encoding.
    #[arg(long, value_enum)]
    encoding: Option<EncodingArg>,

    /// Tone placement for ambiguous nuclei: hoả (modern) or hỏa (old).
    #[arg(long, value_enum)]
    orthography: Option<OrthographyArg>,

    /// Accept tone keys anywhere in the word (the default).
    #[arg(long, overrides_with = "no_free_mark")]
    free_mark: bool,

    /// Re-place the mark after every keystroke instead.
    #[arg(long, overrides_with = "free_mark")]
    no_free_mark: bool,

    /// Check finished words against the lists (the default).
    #[arg(long, overrides_with = "no_spell_check")]
    spell_check: bool,

    /// Leave every composed word as rendered.
    #[arg(long, overrides_with = "spell_check")]
    no_spell_check: bool,

    /// Vietnamese word list (text, or .fst compiled with --compile-fst).
    #[arg(long)]
    vietnamese_wordlist: Option<PathBuf>,

    /// English word list for the restore heuristics.
    #[arg(long)]
    english_wordlist: Option<PathBuf>,

    /// Restore English words as soon as a tone key betrays them.
    #[arg(long)]
    instant_restore: bool,

    /// Compile a text word list into an FST set and exit: TEXT OUT.
    #[arg(long, num_args = 2, value_names = ["TEXT", "OUT"])]
    compile_fst: Option<Vec<PathBuf>>,

    /// Convert a single line and exit.
    #[arg(long)]
    line: Option<String>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum StyleArg {
    Telex,
    Vni,
    SimpleTelex1,
    SimpleTelex2,
}

impl From<StyleArg> for InputStyle {
    fn from(arg: StyleArg) -> Self {
        match arg {
            StyleArg::Telex => InputStyle::Telex,
            StyleArg::Vni => InputStyle::Vni,
            StyleArg::SimpleTelex1 => InputStyle::SimpleTelex1,
            StyleArg::SimpleTelex2 => InputStyle::SimpleTelex2,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum EncodingArg {
    Unicode,
    VniWindows,
    Tcvn3,
}

impl From<EncodingArg> for Encoding {
    fn from(arg: EncodingArg) -> Self {
        match arg {
            EncodingArg::Unicode => Encoding::Unicode,
            EncodingArg::VniWindows => Encoding::VniWindows,
            EncodingArg::Tcvn3 => Encoding::Tcvn3,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum OrthographyArg {
    Modern,
    Old,
}

/// Lay the command-line overrides over the loaded configuration.
fn apply_args(config: &mut VietConfig, args: &Args) {
    if let Some(style) = args.style {
        config.base.style = style.into();
    }
    if let Some(encoding) = args.encoding {
        config.base.encoding = encoding.into();
    }
    if let Some(orthography) = args.orthography {
        config.base.modern_tone_placement = matches!(orthography, OrthographyArg::Modern);
    }
    if args.free_mark {
        config.base.free_tone_mark = true;
    } else if args.no_free_mark {
        config.base.free_tone_mark = false;
    }
    if args.spell_check {
        config.base.spell_check = true;
    } else if args.no_spell_check {
        config.base.spell_check = false;
    }
    if args.instant_restore {
        config.base.instant_restore = true;
    }
    if let Some(path) = &args.vietnamese_wordlist {
        config.vietnamese_wordlist = Some(path.clone());
    }
    if let Some(path) = &args.english_wordlist {
        config.english_wordlist = Some(path.clone());
    }
}

fn convert_line(ime: &mut Ime, line: &str) -> String {
    ime.clear();
    ime.type_str(line);
    ime.finish();
    ime.screen().to_string()
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(paths) = &args.compile_fst {
        libviet::WordList::compile_fst(&paths[0], &paths[1])?;
        println!("compiled {} -> {}", paths[0].display(), paths[1].display());
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => VietConfig::load(path)?,
        None => VietConfig::default(),
    };
    apply_args(&mut config, &args);

    let mut ime = Ime::new(config.build_engine()?);

    if let Some(line) = &args.line {
        println!("{}", convert_line(&mut ime, line));
        return Ok(());
    }

    println!("libviet - type {:?} keystrokes, read Vietnamese", config.base.style);
    println!("Examples: xin chaof, vieetj nam, thuong → thương");
    println!("Press Ctrl+C to exit.");
    println!();

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        println!("  → {}", convert_line(&mut ime, &line));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_lay_over_the_config() {
        let args = Args::try_parse_from([
            "libviet",
            "--style",
            "vni",
            "--encoding",
            "tcvn3",
            "--orthography",
            "old",
            "--no-free-mark",
            "--no-spell-check",
        ])
        .expect("valid command line");
        let mut config = VietConfig::default();
        apply_args(&mut config, &args);
        assert_eq!(config.base.style, InputStyle::Vni);
        assert_eq!(config.base.encoding, Encoding::Tcvn3);
        assert!(!config.base.modern_tone_placement);
        assert!(!config.base.free_tone_mark);
        assert!(!config.base.spell_check);
    }

    #[test]
    fn bare_invocation_parses_with_defaults() {
        let args = Args::try_parse_from(["libviet"]).expect("valid command line");
        let mut config = VietConfig::default();
        apply_args(&mut config, &args);
        assert_eq!(config.base, libviet::Config::default());
    }
}
