// GET / handler

const INDEX_HTML: &str = include_str!("../../static/index.html");

pub fn index_handler() -> impl warp::Reply {
    warp::reply::html(INDEX_HTML)
}
