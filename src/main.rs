//! rTimeblocks main entrypoint.

use rtimeblocks::run;
use rtimeblocks::ui::messages;

fn main() {
    if let Err(e) = run() {
        messages::app_error(&e);
        std::process::exit(1);
    }
}
