#![windows_subsystem = "windows"]

use engine_bootstrap::command_app::CommandApp;
use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

// GUI subsystem: Windows starts us through WinMain, std still hands us argv.
fn main() {
    engine_bootstrap::main_entry::<CommandApp>();
}
