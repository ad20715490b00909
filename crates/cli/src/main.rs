//! CLI tool for importing spreadsheet-driven slideshows.

use anyhow::{bail, Context, Result};
use clap::Parser;
use slidevox_core::{import_slides, BlobStore, ImageAsset, Slide, SlideLibrary};
use slidevox_xlsx::{is_zip_magic, XlsxReader};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Extensions accepted when scanning an image directory.
const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];

/// Import an .xlsx workbook plus a set of images into a slide sequence.
#[derive(Parser, Debug)]
#[command(name = "slidevox")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input workbook (.xlsx)
    input: PathBuf,

    /// Image file to include, in selection order (repeatable)
    #[arg(short, long = "image")]
    images: Vec<PathBuf>,

    /// Directory of images to include (scanned in filename order)
    #[arg(short = 'd', long)]
    images_dir: Option<PathBuf>,

    /// Write the slide JSON to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Also save the result as a named slide set in the library
    #[arg(long, value_name = "NAME")]
    save_as: Option<String>,

    /// Library directory used with --save-as
    #[arg(long, default_value = "slidevox-library")]
    library: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let images = collect_images(&args)?;
    if args.verbose {
        eprintln!("Selected {} images", images.len());
    }

    let slides = import_workbook(&args.input, &images)?;
    if args.verbose {
        eprintln!("Imported {} slides", slides.len());
    }

    let json = if args.pretty {
        serde_json::to_string_pretty(&slides)?
    } else {
        serde_json::to_string(&slides)?
    };

    match &args.output {
        Some(path) => {
            write_output(path, &json)?;
            if args.verbose {
                eprintln!("Written to: {}", path.display());
            }
        }
        None => println!("{}", json),
    }

    if let Some(name) = &args.save_as {
        let set_id = save_to_library(&args.library, name, slides)?;
        if args.verbose {
            eprintln!("Saved as '{}' ({}) in {}", name, set_id, args.library.display());
        }
    }

    Ok(())
}

/// Run the import pipeline on one workbook.
fn import_workbook(input: &Path, images: &[ImageAsset]) -> Result<Vec<Slide>> {
    let file =
        File::open(input).with_context(|| format!("Failed to open {}", input.display()))?;
    let mut reader = BufReader::new(file);

    let mut magic = [0u8; 4];
    reader
        .read_exact(&mut magic)
        .with_context(|| "Failed to read file header")?;
    if !is_zip_magic(&magic) {
        bail!("{} is not an .xlsx workbook", input.display());
    }

    // Re-open for parsing
    let file = File::open(input)?;
    let reader = BufReader::new(file);

    log::debug!("Parsing workbook {}", input.display());
    let grid = XlsxReader::new()
        .parse(reader)
        .with_context(|| format!("Failed to parse {}", input.display()))?;

    import_slides(&grid, images).map_err(Into::into)
}

/// Gather the image selection from --image flags and/or --images-dir.
///
/// Explicit flags come first, in the order given; directory entries follow
/// in filename order so the selection is deterministic across platforms.
fn collect_images(args: &Args) -> Result<Vec<ImageAsset>> {
    let mut paths: Vec<PathBuf> = args.images.clone();

    if let Some(dir) = &args.images_dir {
        let mut from_dir: Vec<PathBuf> = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read image directory {}", dir.display()))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .and_then(|e| e.to_str())
                    .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .collect();
        from_dir.sort();
        paths.extend(from_dir);
    }

    paths.iter().map(|path| image_asset(path)).collect()
}

/// Build an asset from a path: the filename feeds numeric matching, the
/// full path is the URI handed back in the slide.
fn image_asset(path: &Path) -> Result<ImageAsset> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Image path has no filename: {}", path.display()))?;
    Ok(ImageAsset::new(path.to_string_lossy(), name))
}

/// Persist the imported slides as a named set in a file-backed library.
/// Returns the generated set id.
fn save_to_library(library_dir: &Path, name: &str, slides: Vec<Slide>) -> Result<String> {
    let store = FsStore::new(library_dir)?;
    let mut library = SlideLibrary::new(store);

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let id = format!("set-{}", timestamp);

    library
        .save_slide_set(&id, name, slides, timestamp.to_string())
        .with_context(|| format!("Failed to save slide set '{}'", name))?;

    Ok(id)
}

/// Blob store backed by a directory: each key is one JSON file.
struct FsStore {
    root: PathBuf,
}

impl FsStore {
    fn new(root: &Path) -> Result<Self> {
        std::fs::create_dir_all(root)
            .with_context(|| format!("Failed to create library directory {}", root.display()))?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }
}

impl BlobStore for FsStore {
    fn get(&self, key: &str) -> slidevox_core::Result<Option<String>> {
        match std::fs::read_to_string(self.key_path(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> slidevox_core::Result<()> {
        std::fs::write(self.key_path(key), value).map_err(Into::into)
    }

    fn remove(&mut self, key: &str) -> slidevox_core::Result<()> {
        match std::fs::remove_file(self.key_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Write output to a file.
fn write_output(path: &Path, content: &str) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write to {}", path.display()))?;

    Ok(())
}
