use clap::{Parser, Subcommand};
use hgsave::archive::GameMode;
use hgsave::cli::{
    decode_save, encode_save, process_file, process_folder, show_info, DecodeOptions, Direction,
    EncodeOptions, FileOptions, FolderOptions,
};
use hgsave::{ArchiveSlot, CodecMode, CodecOptions, FormatConfig, ProfileKey};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Version info from build.rs
const VERSION: &str = env!("HGSAVE_VERSION");
const PROFILE: &str = env!("HGSAVE_PROFILE");
const GIT_HASH: &str = env!("HGSAVE_GIT_HASH");

fn get_version() -> &'static str {
    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();
    VERSION_STRING.get_or_init(|| format!("{} {} ({})", PROFILE, VERSION, GIT_HASH))
}

#[derive(Parser)]
#[command(name = "hgsave")]
#[command(author, about = "Convert HG save containers to JSON and back", long_about = None)]
struct Cli {
    /// Print version
    #[arg(short = 'V', long)]
    version: bool,

    /// JSON file overriding the container format constants
    #[arg(long, global = true)]
    format: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a metadata + payload pair into a JSON document
    #[command(alias = "d")]
    Decode {
        /// Metadata file (mf_storage*.hg)
        metadata: PathBuf,

        /// Payload file (storage*.hg)
        payload: PathBuf,

        /// Output document
        output: PathBuf,

        /// Archive slot (0-based)
        #[arg(long)]
        slot: u32,

        /// Profile key (numeric suffix of the save folder)
        #[arg(long, value_parser = parse_profile_key)]
        profile_key: Option<ProfileKey>,

        /// Payload chunks are not encrypted
        #[arg(long)]
        plain: bool,
    },

    /// Encode a JSON document into a metadata + payload pair
    #[command(alias = "e")]
    Encode {
        /// Input document
        input: PathBuf,

        /// Metadata file to write
        metadata: PathBuf,

        /// Payload file to write
        payload: PathBuf,

        /// Archive slot (0-based)
        #[arg(long)]
        slot: u32,

        /// Profile key (numeric suffix of the save folder)
        #[arg(long, value_parser = parse_profile_key)]
        profile_key: Option<ProfileKey>,

        /// Do not encrypt payload chunks
        #[arg(long)]
        plain: bool,
    },

    /// Convert every slot of a game mode in a save folder
    #[command(alias = "f")]
    Folder {
        /// Save folder; a trailing `_<number>` is the profile key
        dir: PathBuf,

        /// Encode documents instead of decoding archives
        #[arg(long)]
        encode: bool,

        /// Which slots to convert
        #[arg(long, default_value = "normal", value_parser = parse_game_mode)]
        game_mode: GameMode,

        /// Payload chunks are not encrypted
        #[arg(long)]
        plain: bool,
    },

    /// Convert the archive of one document, with the slot taken from its
    /// file name and the profile key from its folder
    File {
        /// Document path (storage*.json); the archive files sit next to it
        document: PathBuf,

        /// Encode the document instead of decoding its archive
        #[arg(long)]
        encode: bool,

        /// Payload chunks are not encrypted
        #[arg(long)]
        plain: bool,
    },

    /// Show the chunk table of a metadata file
    #[command(alias = "i")]
    Info {
        /// Metadata file to inspect
        file: PathBuf,
    },
}

fn parse_profile_key(s: &str) -> Result<ProfileKey, String> {
    s.parse().map_err(|e| format!("{}", e))
}

fn parse_game_mode(s: &str) -> Result<GameMode, String> {
    s.parse().map_err(|e| format!("{}", e))
}

fn codec_mode(plain: bool) -> CodecMode {
    if plain {
        CodecMode::Plain
    } else {
        CodecMode::Ciphered
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.version {
        println!("hgsave {}", get_version());
        return ExitCode::SUCCESS;
    }

    let command = match cli.command {
        Some(cmd) => cmd,
        None => {
            use clap::CommandFactory;
            let _ = Cli::command().print_help();
            println!();
            return ExitCode::SUCCESS;
        }
    };

    let config = match cli.format {
        Some(path) => match FormatConfig::from_json_file(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => FormatConfig::default(),
    };

    let result = match command {
        Commands::Decode {
            metadata,
            payload,
            output,
            slot,
            profile_key,
            plain,
        } => {
            let options = DecodeOptions {
                codec: CodecOptions::new(ArchiveSlot(slot), profile_key).with_mode(codec_mode(plain)),
                config,
            };
            decode_save(&metadata, &payload, &output, &options).map(|bytes| {
                println!("Decoded {} bytes to {}", bytes, output.display());
            })
        }

        Commands::Encode {
            input,
            metadata,
            payload,
            slot,
            profile_key,
            plain,
        } => {
            let options = EncodeOptions {
                codec: CodecOptions::new(ArchiveSlot(slot), profile_key).with_mode(codec_mode(plain)),
                config,
            };
            encode_save(&input, &metadata, &payload, &options).map(|chunks| {
                println!(
                    "Encoded {} chunks to {} and {}",
                    chunks,
                    metadata.display(),
                    payload.display()
                );
            })
        }

        Commands::Folder {
            dir,
            encode,
            game_mode,
            plain,
        } => {
            let options = FolderOptions {
                direction: if encode { Direction::Encode } else { Direction::Decode },
                game_mode,
                mode: codec_mode(plain),
                config,
            };
            process_folder(&dir, &options).map(|converted| {
                for files in &converted {
                    println!("Slot {}: {}", files.slot, files.document.display());
                }
                println!("Converted {} archives in {}", converted.len(), dir.display());
            })
        }

        Commands::File {
            document,
            encode,
            plain,
        } => {
            let options = FileOptions {
                direction: if encode { Direction::Encode } else { Direction::Decode },
                mode: codec_mode(plain),
                config,
            };
            process_file(&document, &options).map(|files| {
                println!("Slot {}: {}", files.slot, files.document.display());
            })
        }

        Commands::Info { file } => show_info(&file, &config).map(|info| print!("{}", info)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
