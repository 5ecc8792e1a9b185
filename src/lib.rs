//! Interactive graph explorer.
//!
//! The pure core ([`graph`], [`layout`], [`geometry`], [`state`],
//! [`interaction`]) turns backend payloads into a validated model, places it
//! on a plane and tracks request lifecycles. The Leptos client renders it onto
//! canvases: a force-directed knowledge graph and a columnar ER diagram.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

pub mod config;
pub mod geometry;
pub mod graph;
pub mod interaction;
pub mod layout;
pub mod state;

mod components;
mod pages;

use crate::pages::explore::Explore;
use crate::pages::not_found::NotFound;
use crate::pages::schema::Schema;

#[cfg(test)]
use proptest as _;
#[cfg(all(test, not(target_arch = "wasm32")))]
use wasm_bindgen_test as _;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// Router for the graph explorer and the schema viewer, with a 404 fallback.
#[component]
pub fn App() -> impl IntoView {
	// Provides context that manages stylesheets, titles, meta tags, etc.
	provide_meta_context();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="light" />

		<Title text="Graph Explorer" />

		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<nav class="top-nav">
				<A href="/">"Explore"</A>
				<A href="/schema">"Schema"</A>
			</nav>
			<main>
				<Routes fallback=|| view! { <NotFound /> }>
					<Route path=path!("/") view=Explore />
					<Route path=path!("/schema") view=Schema />
				</Routes>
			</main>
		</Router>
	}
}
