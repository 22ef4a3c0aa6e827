use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::settings::{get_data_dir, load_settings, save_settings, shellexpand_path};

pub fn run(data_dir: Option<String>) -> Result<()> {
    if let Some(dir) = data_dir {
        let mut settings = load_settings();
        settings.data_dir = shellexpand_path(&dir);
        save_settings(&settings)?;
    }

    let resolved = get_data_dir();
    std::fs::create_dir_all(&resolved)?;

    let conn = get_connection(&resolved.join("masroof.db"))?;
    init_db(&conn)?;

    println!("Initialized masroof at {}", resolved.display());
    Ok(())
}
