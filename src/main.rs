use graph_explorer::App;

fn main() {
	graph_explorer::init_logging();
	leptos::mount::mount_to_body(App);
}
