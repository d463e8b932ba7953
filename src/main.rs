//! Client entrypoint for the CSR build.

// Bin target reuses lib deps, silence noisy lint.
#![allow(unused_crate_dependencies)]

use constellation_bg::{App, DEFAULT_CANVAS_ID, attach, init_logging};
use leptos::prelude::*;

fn main() {
	init_logging();

	// Host pages that ship their own canvas get the background drawn there;
	// otherwise render the demo app.
	match attach(DEFAULT_CANVAS_ID) {
		Some(constellation) => constellation.run_forever(),
		None => mount_to_body(|| {
			view! { <App /> }
		}),
	}
}
