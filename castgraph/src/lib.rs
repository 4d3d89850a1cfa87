pub mod handlers;

pub use handlers::{
    add_vertex_to, crawl_config_from, expand_path, format_count, load_graph, remove_vertex_from,
    render_crawl_summary, render_ranking, update_vertex_in,
};
