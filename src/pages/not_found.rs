use leptos::prelude::*;
use leptos_router::components::A;

/// 404 page
#[component]
pub fn NotFound() -> impl IntoView {
	view! {
		<div class="not-found">
			<h1>"Page not found"</h1>
			<p>
				"Nothing lives here. Back to the "
				<A href="/">"explorer"</A>
				"."
			</p>
		</div>
	}
}
