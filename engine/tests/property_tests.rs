use proptest::prelude::*;
use sdk::types::Priority;
use tempfile::TempDir;

use intellicode_engine::config::Config;
use intellicode_engine::memory_bank::MemoryBank;
use intellicode_engine::summarizer::{
    condense_prose, retained_count, retention, split_sentences, Summarizer,
};

fn prose(words: &[String]) -> String {
    words
        .iter()
        .map(|w| format!("Sentence about {}.", w))
        .collect::<Vec<_>>()
        .join(" ")
}

fn summarizer() -> (TempDir, Summarizer) {
    let temp = TempDir::new().unwrap();
    let config = Config::for_workspace(temp.path()).unwrap();
    let bank = MemoryBank::new(config.core.memory_root.clone());
    let summarizer = Summarizer::new(&config, bank, None).unwrap();
    (temp, summarizer)
}

proptest! {
    // P2 keeps ceil(N * (1 - rate * 0.4)) sentences
    #[test]
    fn test_p2_retained_sentence_count(
        words in prop::collection::vec("[a-z]{1,8}", 1..40),
        rate in 0.0..=1.0f64,
    ) {
        let text = prose(&words);
        let n = words.len();
        let (kept, truncated) = condense_prose(&text, retention(Priority::P2, rate));

        let expected = retained_count(n, 1.0 - rate * 0.4);
        prop_assert_eq!(kept.len(), expected);
        prop_assert!(kept.len() as f64 >= n as f64 * (1.0 - rate * 0.4) - 1e-9);
        prop_assert!(kept.len() <= n);
        prop_assert_eq!(truncated, expected < n);
    }

    // Kept sentences are a prefix of the original, in order
    #[test]
    fn test_condensed_sentences_are_a_prefix(
        words in prop::collection::vec("[a-z]{1,8}", 1..30),
        rate in 0.0..=1.0f64,
    ) {
        let text = prose(&words);
        let all = split_sentences(&text);
        let (kept, _) = condense_prose(&text, retention(Priority::P1, rate));
        prop_assert_eq!(&all[..kept.len()], &kept[..]);
    }

    // P0 text is never compressed, whatever the rate
    #[test]
    fn test_p0_is_zero_compression(
        words in prop::collection::vec("[a-z]{1,8}", 0..30),
        rate in 0.0..=1.0f64,
    ) {
        let (_temp, summarizer) = summarizer();
        let text = prose(&words);
        prop_assert_eq!(summarizer.condense(&text, Priority::P0, rate), text);
    }

    // Transcripts made only of P0 lines come through the render untouched
    #[test]
    fn test_all_p0_transcript_is_kept(
        lines in prop::collection::vec("[a-z ]{0,20}", 1..10),
        rate in 0.0..=1.0f64,
    ) {
        let (_temp, summarizer) = summarizer();
        let transcript = lines
            .iter()
            .map(|l| format!("CODE {}", l))
            .collect::<Vec<_>>()
            .join("\n");

        let summary = summarizer.render(&transcript, sdk::types::SummaryType::Concise, rate);
        for line in transcript.lines() {
            prop_assert!(summary.contains(line));
        }
    }

    // Keyword-free transcripts land wholly in General Discussion at P2 retention
    #[test]
    fn test_render_places_plain_transcript_in_general_discussion(
        words in prop::collection::vec("[a-z]{1,8}", 1..30),
        rate in 0.0..=1.0f64,
    ) {
        let (_temp, summarizer) = summarizer();
        let transcript = words
            .iter()
            .map(|w| format!("Note about {} here.", w))
            .collect::<Vec<_>>()
            .join("\n");

        let summary = summarizer.render(&transcript, sdk::types::SummaryType::Detailed, rate);
        let (head, general) = summary.split_once("### General Discussion\n").unwrap();
        let (critical, key) = head
            .split_once("### Critical Actions\n")
            .unwrap()
            .1
            .split_once("### Key Discussions (High Priority)\n")
            .unwrap();
        prop_assert_eq!(critical.trim(), "");
        prop_assert_eq!(key.trim(), "");

        let n = words.len();
        let expected = retained_count(n, 1.0 - rate * 0.4);
        let general = general.trim_end();
        let body = general.strip_suffix(" ...").unwrap_or(general);
        prop_assert_eq!(general.ends_with(" ..."), expected < n);
        prop_assert_eq!(split_sentences(body).len(), expected);
    }

    #[test]
    fn test_retention_ordering(rate in 0.0..=1.0f64) {
        let p0 = retention(Priority::P0, rate);
        let p1 = retention(Priority::P1, rate);
        let p2 = retention(Priority::P2, rate);
        prop_assert!(p0 >= p1 && p1 >= p2);
        prop_assert!(p2 >= 0.6 - 1e-12);
    }
}
