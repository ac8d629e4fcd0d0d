use engine_bootstrap::command_app::CommandApp;
use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() {
    engine_bootstrap::main_entry::<CommandApp>();
}
