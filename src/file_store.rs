use crate::{
    error::{Error, Result},
    json_store::{decode_document, encode_document, JsonStore},
};
use fs2::FileExt;
use log::{debug, warn};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{
    ser::{PrettyFormatter, Serializer},
    Value,
};
use std::{
    fs::{create_dir_all, remove_file, rename, File, OpenOptions},
    io::{prelude::*, ErrorKind},
    path::{Path, PathBuf},
};
use uuid::Uuid;

#[derive(Clone, Copy, Debug)]
pub struct Config {
    pub pretty: bool,
    pub indent: usize,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            indent: 2,
            pretty: true,
        }
    }
}

/// Keeps every collection in its own `<collection>.json` file below `path`.
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
    cfg: Config,
}

impl JsonStore for FileStore {
    fn load<T>(&self, collection: &str) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let file_name = self.collection_path(collection);
        let json = match FileStore::get_json_from_file(&file_name) {
            Ok(json) => json,
            Err(Error::Io(err)) if err.kind() == ErrorKind::NotFound => {
                debug!("No file for {collection} at {}", file_name.display());
                return Ok(vec![]);
            }
            Err(err) => return Err(err),
        };
        decode_document(collection, json)
    }

    fn persist<T>(&self, collection: &str, records: &[T]) -> Result<()>
    where
        T: Serialize,
    {
        let doc = encode_document(collection, records);
        self.save_object_to_file(&doc, &self.collection_path(collection))
    }
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<FileStore> {
        FileStore::new_with_cfg(path, Config::default())
    }

    pub fn new_with_cfg<P: AsRef<Path>>(path: P, cfg: Config) -> Result<FileStore> {
        let s = FileStore {
            path: path.as_ref().to_path_buf(),
            cfg,
        };
        if let Err(err) = create_dir_all(&s.path) {
            if err.kind() != ErrorKind::AlreadyExists {
                return Err(err.into());
            }
        }
        Ok(s)
    }

    /// Returns the directory holding the collection files.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the file backing `collection`.
    pub fn collection_path(&self, collection: &str) -> PathBuf {
        self.path.join(collection).with_extension("json")
    }

    fn to_writer_pretty<W: Write, T: Serialize>(&self, writer: &mut W, value: &T) -> Result<()> {
        let indent = vec![b' '; self.cfg.indent];
        let mut s = Serializer::with_formatter(writer, PrettyFormatter::with_indent(&indent));
        value.serialize(&mut s)?;
        Ok(())
    }

    fn object_to_bytes<T: Serialize>(&self, obj: &T) -> Result<Vec<u8>> {
        if self.cfg.pretty {
            let mut writer: Vec<u8> = vec![];
            self.to_writer_pretty(&mut writer, obj)?;
            Ok(writer)
        } else {
            Ok(serde_json::to_vec(obj)?)
        }
    }

    // Writes a sibling temp file and renames it over `file_name`. An existing
    // target stays exclusively locked until the rename; a missing one is
    // never created before the rename, and the temp file is removed on
    // every failure.
    fn save_object_to_file<T: Serialize>(&self, obj: &T, file_name: &Path) -> Result<()> {
        let bytes = self.object_to_bytes(obj)?;
        let mut tmp_filename = file_name.to_path_buf();
        tmp_filename.set_file_name(Uuid::new_v4().to_string());
        tmp_filename.set_extension("tmp");
        let mut tmp_file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp_filename)?;
        match FileStore::replace_file(&mut tmp_file, &tmp_filename, file_name, &bytes) {
            Ok(()) => Ok(()),
            Err(err) => {
                drop(tmp_file);
                if let Err(rm_err) = remove_file(&tmp_filename) {
                    warn!("Could not remove {}: {rm_err}", tmp_filename.display());
                }
                Err(err.into())
            }
        }
    }

    fn replace_file(
        tmp_file: &mut File,
        tmp_filename: &Path,
        file_name: &Path,
        bytes: &[u8],
    ) -> std::io::Result<()> {
        tmp_file.lock_exclusive()?;
        tmp_file.write_all(bytes)?;
        tmp_file.sync_all()?;
        let target = match OpenOptions::new().read(true).open(file_name) {
            Ok(f) => Some(f),
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => return Err(err),
        };
        if let Some(f) = &target {
            f.lock_exclusive()?;
        }
        rename(tmp_filename, file_name)?;
        // The data is in place; closing the handles releases the locks too.
        if let Some(f) = &target {
            if let Err(err) = f.unlock() {
                warn!("Could not unlock {}: {err}", file_name.display());
            }
        }
        if let Err(err) = tmp_file.unlock() {
            warn!("Could not unlock {}: {err}", tmp_filename.display());
        }
        Ok(())
    }

    fn get_string_from_file(file_name: &Path) -> Result<String> {
        let mut f = OpenOptions::new()
            .read(true)
            .write(false)
            .create(false)
            .open(file_name)?;
        let mut buffer = String::new();
        f.lock_shared()?;
        f.read_to_string(&mut buffer)?;
        f.unlock()?;
        Ok(buffer)
    }

    fn get_json_from_file(file_name: &Path) -> Result<Value> {
        let s = FileStore::get_string_from_file(file_name)?;
        Ok(serde_json::from_str(&s)?)
    }
}
