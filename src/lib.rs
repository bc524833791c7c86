pub(crate) mod util;

pub mod analysis;
pub mod engine;

#[cfg(feature = "csr")]
pub mod components;
#[cfg(feature = "csr")]
mod pages;

#[cfg(feature = "csr")]
pub use app::App;

#[cfg(feature = "csr")]
mod app {
	use crate::pages;
	use leptos::prelude::*;
	use leptos_meta::*;

	#[component]
	pub fn App() -> impl IntoView {
		provide_meta_context();

		view! {
			<Html attr:lang="en" attr:dir="ltr" attr:data-theme="light"/>

			<Title formatter=|page| format!("Inkpatch - {page}")/>

			// Inject metadata in the <head> tag.
			<Meta charset="UTF-8"/>
			<Meta name="viewport" content="width=device-width, initial-scale=1.0"/>

			<pages::Home/>
		}
	}
}
