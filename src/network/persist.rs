use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Serialize, Deserialize};

use crate::error::{NetError, Result};
use crate::layers::Layer;
use crate::network::network::Network;

/// Bumped whenever the on-disk layout changes incompatibly.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct ModelFileRef<'a> {
    format_version: u32,
    network: &'a Network,
}

#[derive(Deserialize)]
struct ModelFile {
    format_version: u32,
    network: Network,
}

impl Network {
    /// Path `save` writes to: `<directory>/<name>.json`.
    pub fn model_path(directory: impl AsRef<Path>, name: &str) -> PathBuf {
        directory.as_ref().join(format!("{}.json", name))
    }

    /// Path `pretty_print` writes to: `<directory>/<name>.txt`.
    pub fn report_path(directory: impl AsRef<Path>, name: &str) -> PathBuf {
        directory.as_ref().join(format!("{}.txt", name))
    }

    /// Writes every layer's type tag, dimensions and parameters, plus the
    /// hyperparameters, to `<directory>/<name>.json`.  The directory is
    /// created if missing.  The file appears only once it is complete.
    ///
    /// A network holding NaN or infinite parameters (e.g. after diverging)
    /// cannot be stored losslessly; it is refused with `Configuration` and
    /// nothing is written.
    pub fn save(&self, directory: impl AsRef<Path>, name: &str) -> Result<()> {
        check_name(name)?;
        self.validate()
            .map_err(|e| NetError::Configuration(format!("refusing to save network '{}': {}", name, e)))?;
        let path = Network::model_path(&directory, name);
        let doc = ModelFileRef { format_version: FORMAT_VERSION, network: self };
        write_atomically(&path, |w| {
            serde_json::to_writer_pretty(&mut *w, &doc)?;
            writeln!(w)
        })?;
        tracing::info!("Saved network ({} parameters) to '{}'", self.parameter_count(), path.display());
        Ok(())
    }

    /// Reads a network written by `save`.  Parameter values come back
    /// bit-for-bit; any structural inconsistency is a `CorruptFormat` error.
    pub fn load(directory: impl AsRef<Path>, name: &str) -> Result<Network> {
        check_name(name)?;
        let path = Network::model_path(&directory, name);
        let json = fs::read_to_string(&path).map_err(|e| NetError::io(&path, e))?;

        let file: ModelFile = serde_json::from_str(&json)
            .map_err(|e| NetError::CorruptFormat(format!("'{}': {}", path.display(), e)))?;
        if file.format_version != FORMAT_VERSION {
            return Err(NetError::CorruptFormat(format!(
                "'{}': unsupported format version {} (expected {})",
                path.display(),
                file.format_version,
                FORMAT_VERSION
            )));
        }

        let mut network = file.network;
        if network.batch_size == 0 || !(network.learning_rate.is_finite() && network.learning_rate > 0.0) {
            return Err(NetError::CorruptFormat(format!(
                "'{}': invalid hyperparameters (batch size {}, learning rate {})",
                path.display(),
                network.batch_size,
                network.learning_rate
            )));
        }
        network
            .validate_and_prepare()
            .map_err(|e| NetError::CorruptFormat(format!("'{}': {}", path.display(), e)))?;

        tracing::info!("Loaded network with {} layers from '{}'", network.layers().len(), path.display());
        Ok(network)
    }

    /// Writes a human-readable report of the architecture and every parameter
    /// to `<directory>/<name>.txt`.  Display only; `load` cannot read it back.
    pub fn pretty_print(&self, directory: impl AsRef<Path>, name: &str) -> Result<()> {
        check_name(name)?;
        let path = Network::report_path(&directory, name);
        write_atomically(&path, |w| {
            let title = format!("Network: {}", name);
            writeln!(w, "{}", title)?;
            writeln!(w, "{}", "=".repeat(title.len()))?;
            write!(w, "{}", self)
        })?;
        tracing::debug!("Wrote network report to '{}'", path.display());
        Ok(())
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "input size    : {}", self.input_size())?;
        writeln!(f, "output size   : {}", self.output_size())?;
        writeln!(f, "parameters    : {}", self.parameter_count())?;
        writeln!(f, "batch size    : {}", self.batch_size)?;
        writeln!(f, "learning rate : {}", self.learning_rate)?;
        writeln!(f, "loss          : {}", self.loss.name())?;

        for (i, layer) in self.layers().iter().enumerate() {
            writeln!(f)?;
            write!(f, "[{}] {} {} -> {}", i, layer.name(), layer.input_size(), layer.output_size())?;
            match layer {
                Layer::Linear(l) => {
                    writeln!(f, " ({} parameters)", l.parameter_count())?;
                    writeln!(f, "    weights:")?;
                    for row in &l.weights.data {
                        writeln!(f, "      {}", format_row(row))?;
                    }
                    writeln!(f, "    biases:")?;
                    writeln!(f, "      {}", format_row(&l.biases))?;
                }
                Layer::Activation(_) | Layer::Softmax(_) => writeln!(f)?,
            }
        }
        Ok(())
    }
}

fn format_row(values: &[f64]) -> String {
    let cells: Vec<String> = values.iter().map(|v| format!("{:>10.6}", v)).collect();
    format!("[{} ]", cells.concat())
}

/// Rejects names that would escape `directory` or produce a hidden/empty file.
fn check_name(name: &str) -> Result<()> {
    if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\']) {
        return Err(NetError::Configuration(format!("invalid model name '{}'", name)));
    }
    Ok(())
}

/// Writes to a hidden sibling file, then renames it over `path`, so a failed
/// write never leaves a complete-looking file behind.
fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| NetError::io(dir, e))?;
    }
    let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    let tmp = path.with_file_name(format!(".{}.tmp", file_name));

    let result = File::create(&tmp)
        .and_then(|file| {
            let mut writer = BufWriter::new(file);
            write(&mut writer)?;
            let file = writer.into_inner().map_err(|e| e.into_error())?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&tmp, path));

    result.map_err(|e| {
        let _ = fs::remove_file(&tmp);
        NetError::io(path, e)
    })
}
