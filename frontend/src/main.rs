mod app;

use env_logger::Env;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("gridpath")
            .with_inner_size([1100.0, 800.0])
            .with_min_inner_size([500.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "gridpath",
        native_options,
        Box::new(|cc| Box::new(app::App::new(cc))),
    )
}
