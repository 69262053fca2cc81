//! Article page scraping.
//!
//! Pages are fetched once with a bounded timeout and parsed with `scraper`
//! into an [`ArticleRecord`](crate::models::ArticleRecord). Extraction is
//! heuristic: a page that yields no title or body still produces a record,
//! only the failure to download the page at all is an error.
//!
//! | Field | Heuristic |
//! |-------|-----------|
//! | title | `og:title`, then `<title>`, then the first `<h1>` |
//! | body  | `<p>` elements inside `<article>` / `articleBody` / `<main>`, else the whole page |
//! | image | `twitter:image`, `link[rel=image_src]`, first image in the content; then the `og:image` of a raw re-fetch |

pub mod article;
