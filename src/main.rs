use clap::Parser;
use colorgallery::storage::FileStore;
use colorgallery::ui::{App, UiState};
use colorgallery::Options;

fn main() -> anyhow::Result<()> {
    let options = Options::parse();
    options.setup_logger()?;

    let store = FileStore::new(options.history_dir());
    log::info!("color history directory: {}", store.dir().display());

    let ui = UiState::open(store, options.defaults);
    let app = App::new(ui)?;
    app.run()?;
    log::debug!("quit");
    Ok(())
}
