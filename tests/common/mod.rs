//! Shared fixtures for integration tests.
//!
//! [`FakeRunner`] stands in for every external program the pipeline calls.
//! It produces the files the real tools would, so whole releases can run
//! without pyinstaller, ffmpeg, hdiutil or makensis installed.

#![allow(dead_code)]

use kodegen_bundler_desktop::bundler::{
    Platform, ReleaseContextBuilder, Result, ToolInvocation, ToolOutput, ToolRunner,
};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;
use walkdir::WalkDir;

/// How the fake transcoders treat their input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaBehavior {
    /// Write half of the input bytes.
    Shrink,
    /// Write the input plus padding.
    Grow,
    /// Write the input bytes reversed: same size, different content.
    Reverse,
    /// Write a partial output, then exit non-zero.
    Fail,
}

/// Scriptable [`ToolRunner`] that records every invocation.
pub struct FakeRunner {
    missing: BTreeSet<String>,
    media: MediaBehavior,
    packager_output: bool,
    leaks: Vec<(PathBuf, Vec<u8>)>,
    calls: Mutex<Vec<ToolInvocation>>,
}

impl Default for FakeRunner {
    fn default() -> Self {
        Self {
            missing: BTreeSet::new(),
            media: MediaBehavior::Shrink,
            packager_output: true,
            leaks: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports `program` as not installed.
    pub fn without(mut self, program: &str) -> Self {
        self.missing.insert(program.to_string());
        self
    }

    pub fn media(mut self, behavior: MediaBehavior) -> Self {
        self.media = behavior;
        self
    }

    /// Packager exits 0 without writing a bundle.
    pub fn producing_nothing(mut self) -> Self {
        self.packager_output = false;
        self
    }

    /// Packager also writes `relative` (inside the bundle) with `contents`.
    pub fn leaking(mut self, relative: impl Into<PathBuf>, contents: &[u8]) -> Self {
        self.leaks.push((relative.into(), contents.to_vec()));
        self
    }

    pub fn calls(&self) -> Vec<ToolInvocation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, program: &str) -> usize {
        self.calls()
            .iter()
            .filter(|inv| inv.program() == program)
            .count()
    }

    fn packager(&self, inv: &ToolInvocation) -> io::Result<ToolOutput> {
        if !self.packager_output {
            return Ok(ToolOutput::ok());
        }

        let dist = PathBuf::from(inv.flag_value("--distpath").expect("--distpath"));
        let name = inv
            .flag_value("--name")
            .expect("--name")
            .to_string_lossy()
            .into_owned();
        let add_data = inv
            .flag_value("--add-data")
            .expect("--add-data")
            .to_string_lossy()
            .into_owned();
        let (source, dest) = add_data
            .rsplit_once(';')
            .or_else(|| add_data.rsplit_once(':'))
            .expect("--add-data separator");

        let (bundle, data_root) = if inv.flag_value("--osx-bundle-identifier").is_some() {
            let bundle = dist.join(format!("{name}.app"));
            let contents = bundle.join("Contents");
            fs::create_dir_all(contents.join("MacOS"))?;
            fs::write(contents.join("MacOS").join(&name), b"\xcf\xfa\xed\xfe fake binary")?;

            let mut dict = plist::Dictionary::new();
            dict.insert("CFBundleName".into(), plist::Value::String(name.clone()));
            dict.insert(
                "CFBundleShortVersionString".into(),
                plist::Value::String("0.0.0".into()),
            );
            plist::Value::Dictionary(dict)
                .to_file_xml(contents.join("Info.plist"))
                .map_err(io::Error::other)?;

            (bundle, contents.join("Resources"))
        } else {
            let bundle = dist.join(&name);
            fs::create_dir_all(&bundle)?;
            fs::write(bundle.join(format!("{name}.exe")), b"MZ fake binary")?;
            (bundle.clone(), bundle.join("_internal"))
        };

        copy_tree(Path::new(source), &data_root.join(dest))?;

        for (relative, contents) in &self.leaks {
            let path = bundle.join(relative);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, contents)?;
        }
        Ok(ToolOutput::ok())
    }

    fn transcoder(&self, inv: &ToolInvocation) -> io::Result<ToolOutput> {
        let args = inv.arguments();
        let input = match inv.program() {
            "magick" => PathBuf::from(&args[0]),
            _ => PathBuf::from(inv.flag_value("-i").expect("-i")),
        };
        let output = PathBuf::from(args.last().expect("output argument"));
        let bytes = fs::read(&input)?;

        match self.media {
            MediaBehavior::Shrink => {
                let keep = (bytes.len() / 2).max(1);
                fs::write(&output, &bytes[..keep.min(bytes.len())])?;
                Ok(ToolOutput::ok())
            }
            MediaBehavior::Grow => {
                let mut grown = bytes;
                grown.extend_from_slice(&[0u8; 64]);
                fs::write(&output, grown)?;
                Ok(ToolOutput::ok())
            }
            MediaBehavior::Reverse => {
                let mut reversed = bytes;
                reversed.reverse();
                fs::write(&output, reversed)?;
                Ok(ToolOutput::ok())
            }
            MediaBehavior::Fail => {
                fs::write(&output, b"partial")?;
                Ok(ToolOutput::failed(1, "simulated encoder crash"))
            }
        }
    }

    fn hdiutil(&self, inv: &ToolInvocation) -> io::Result<ToolOutput> {
        let source = PathBuf::from(inv.flag_value("-srcfolder").expect("-srcfolder"));
        assert!(source.is_dir(), "hdiutil source folder must exist");
        let dmg = PathBuf::from(inv.arguments().last().expect("dmg path"));
        fs::write(dmg, b"koly fake disk image")?;
        Ok(ToolOutput::ok())
    }

    fn makensis(&self, inv: &ToolInvocation) -> io::Result<ToolOutput> {
        let output = inv
            .arguments()
            .iter()
            .find_map(|arg| {
                arg.to_str()
                    .and_then(|a| a.strip_prefix("-DOUTPUT_FILE="))
                    .map(PathBuf::from)
            })
            .expect("-DOUTPUT_FILE define");
        let script = PathBuf::from(inv.arguments().last().expect("script path"));
        assert!(script.is_file(), "installer script must exist");
        fs::write(output, b"MZ fake installer")?;
        Ok(ToolOutput::ok())
    }
}

impl ToolRunner for FakeRunner {
    fn is_available(&self, program: &str) -> bool {
        !self.missing.contains(program)
    }

    async fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput> {
        self.calls.lock().unwrap().push(invocation.clone());

        let output = match invocation.program() {
            "pyinstaller" => self.packager(invocation)?,
            "magick" | "ffmpeg" => self.transcoder(invocation)?,
            "hdiutil" => self.hdiutil(invocation)?,
            "makensis" => self.makensis(invocation)?,
            other => ToolOutput::failed(127, format!("{other}: command not found")),
        };
        Ok(output)
    }
}

/// Recursively copies `from` into `to`.
pub fn copy_tree(from: &Path, to: &Path) -> io::Result<()> {
    for entry in WalkDir::new(from) {
        let entry = entry.map_err(io::Error::other)?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(io::Error::other)?;
        let target = to.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Every regular file under `root`, keyed by relative path.
pub fn snapshot(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let relative = e.path().strip_prefix(root).unwrap().to_path_buf();
            (relative, fs::read(e.path()).unwrap())
        })
        .collect()
}

/// File names directly inside `dir`, sorted.
pub fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .map(|rd| {
            rd.filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

/// Throwaway project: `resources/`, `main.py` and pipeline directories.
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("resources")).unwrap();
        fs::write(dir.path().join("main.py"), b"print('hello')\n").unwrap();
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn resources(&self) -> PathBuf {
        self.root().join("resources")
    }

    pub fn staging(&self) -> PathBuf {
        self.root().join("build").join("staging_resources")
    }

    pub fn build(&self) -> PathBuf {
        self.root().join("build").join("bundle")
    }

    pub fn output(&self) -> PathBuf {
        self.root().join("dist")
    }

    /// Writes `bytes` at `relative` under the resource tree.
    pub fn resource(&self, relative: &str, bytes: &[u8]) -> &Self {
        let path = self.resources().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, bytes).unwrap();
        self
    }

    /// Writes a small RGBA PNG and returns its path.
    pub fn png_icon(&self) -> PathBuf {
        let path = self.root().join("icon.png");
        image::RgbaImage::from_pixel(64, 64, image::Rgba([200, 80, 40, 255]))
            .save(&path)
            .unwrap();
        path
    }

    /// Builder pre-filled with this project's directories.
    pub fn context(&self, platform: Platform) -> ReleaseContextBuilder {
        ReleaseContextBuilder::new()
            .platform(platform)
            .version("1.4.0")
            .product_name("Fleet Snowfluff")
            .resources_dir(self.resources())
            .entry_point(self.root().join("main.py"))
            .staging_dir(self.staging())
            .build_dir(self.build())
            .output_dir(self.output())
    }
}

/// `len` bytes of a repeating pattern.
pub fn blob(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}
