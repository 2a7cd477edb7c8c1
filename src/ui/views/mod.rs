mod movie_detail;
mod movie_list;

pub use movie_detail::MovieDetailView;
pub use movie_list::MovieListView;
