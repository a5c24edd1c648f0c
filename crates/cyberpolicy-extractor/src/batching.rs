//! Greedy page batching under a word budget

use crate::types::Batch;

/// Count whitespace-delimited words
///
/// This is an approximation of model tokens, not a tokenizer.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Group consecutive pages, starting at `start`, into one batch
///
/// Pages are added while the running word count plus the next page's words
/// stays strictly below `max_words`; the first page that would reach the
/// budget ends the batch and is left for the next call. Pages are never
/// split. If the page at `start` alone reaches the budget the batch is empty,
/// and the caller must decide how to move past it.
///
/// Page numbers in the result are 1-based and absolute (`start` 0 yields
/// page 1).
pub fn batch_pages<S: AsRef<str>>(pages: &[S], start: usize, max_words: usize) -> Batch {
    let mut text = String::new();
    let mut page_numbers = Vec::new();
    let mut running = 0;

    for (index, page) in pages.iter().enumerate().skip(start) {
        let page_text = page.as_ref();
        let words = word_count(page_text);

        if running + words >= max_words {
            break;
        }

        text.push_str(&format!("\n=== PAGE {} ===\n{}", index + 1, page_text));
        running += words;
        page_numbers.push(index + 1);
    }

    Batch {
        text,
        page_numbers,
        word_count: running,
        max_words,
    }
}
