use std::env;
use std::path::PathBuf;

fn fallback_dotenv_path(cache_dir: Option<PathBuf>, home_dir: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(dir) = cache_dir {
        return Some(dir.join(".env"));
    }
    Some(home_dir?.join(".ceurws/.env"))
}

pub fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    let fallback = fallback_dotenv_path(
        env::var_os("CEURSPT_CACHE_DIR").map(PathBuf::from),
        dirs::home_dir(),
    );

    let Some(path) = fallback else {
        return;
    };
    if path.is_file() {
        let _ = dotenvy::from_path(&path);
    }
}
