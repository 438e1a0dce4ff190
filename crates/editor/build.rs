//! Кладёт config.toml рядом с бинарником редактора.
//!
//! Конфиг ищется вверх от каталога крейта (обычно корень workspace).
//! Если в target/<profile> уже лежит такой же файл, он не перезаписывается,
//! чтобы не менять его mtime при каждой сборке.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.toml";

fn main() {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let Some(source) = find_config(&manifest_dir) else {
        println!(
            "cargo:warning={} not found above {}, editor will use the embedded default",
            CONFIG_FILE,
            manifest_dir.display()
        );
        return;
    };
    println!("cargo:rerun-if-changed={}", source.display());

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let profile = env::var("PROFILE").unwrap();
    let Some(bin_dir) = profile_dir(&out_dir, &profile) else {
        println!("cargo:warning=target/{} not found from OUT_DIR, {} not copied", profile, CONFIG_FILE);
        return;
    };

    let dest = bin_dir.join(CONFIG_FILE);
    let content = fs::read(&source).unwrap_or_else(|e| panic!("Failed to read {}: {}", source.display(), e));
    if fs::read(&dest).ok().as_deref() == Some(content.as_slice()) {
        return;
    }
    fs::write(&dest, &content).unwrap_or_else(|e| panic!("Failed to write {}: {}", dest.display(), e));
}

/// Ближайший config.toml в каталоге крейта или выше
fn find_config(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE))
        .find(|path| path.is_file())
}

/// OUT_DIR = target/<profile>/build/editor-xxx/out -> target/<profile>
fn profile_dir<'a>(out_dir: &'a Path, profile: &str) -> Option<&'a Path> {
    out_dir.ancestors().find(|p| p.ends_with(profile))
}
