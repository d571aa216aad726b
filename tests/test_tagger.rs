use std::thread;

use hmmtag::{tag_corpus, Corpus, DefaultTag, Error, Evaluation, HmmModel, HmmTagger, Tagger, TaggerConfig, WriterSink};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).filter_level(log::LevelFilter::Debug).try_init();
}

fn trained() -> HmmModel {
    HmmModel::train(&Corpus::from_path("tests/data/pos.train").expect("failed to read training data"))
}

#[test]
fn worked_example() {
    init_logger();
    let model = HmmModel::from_lines(["the/DT dog/NN runs/VB"]).unwrap();
    let mut tagger = HmmTagger::new(&model, &TaggerConfig::default());
    let test = Corpus::parse_lines(["the/DT dog/NN runs/VB"]).unwrap();
    let mut sink = WriterSink::new(Vec::new());
    let ev = tag_corpus(&mut tagger, &test, &mut sink).unwrap();
    assert_eq!(ev.accuracy(), Some(1.0));
    let out = String::from_utf8(sink.into_inner()).unwrap();
    assert_eq!(out, "the/DT dog/NN runs/VB\nAccuracy: 1\n");
}

#[test]
fn unseen_words_never_dead_end() {
    init_logger();
    let model = HmmModel::from_lines(["the/DT dog/NN runs/VB"]).unwrap();
    let mut tagger = HmmTagger::new(&model, &TaggerConfig::default());
    let tags = tagger.tag(&["the", "cat", "sleeps"]);
    assert_eq!(tags.len(), 3);
    assert_eq!(tags[0], "DT");

    let long: Vec<String> = (0..10_000).map(|i| format!("w{}", i % 97)).collect();
    let words: Vec<&str> = long.iter().map(String::as_str).collect();
    let tags = tagger.tag(&words);
    assert_eq!(tags.len(), words.len());
    assert!(tags.iter().all(|t| t == "NN"));
}

#[test]
fn tag_test_corpus() {
    init_logger();
    let model = trained();
    let mut tagger = HmmTagger::new(&model, &TaggerConfig::default());
    let test = Corpus::from_path("tests/data/pos.test").expect("failed to read test data");
    let mut sink = WriterSink::new(Vec::new());
    let ev = tag_corpus(&mut tagger, &test, &mut sink).unwrap();
    println!("{}", ev.report());

    assert_eq!(ev.num_sentences(), 5);
    assert_eq!((ev.correct(), ev.total()), (27, 29));
    let acc = ev.accuracy().unwrap();
    assert!((0.0..=1.0).contains(&acc));

    let out = String::from_utf8(sink.into_inner()).unwrap();
    let lines: Vec<_> = out.lines().collect();
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[2], "The/DT zebra/NN sleeps/VBZ on/IN the/DT sofa/NN ./.");
    assert_eq!(lines[4], "Birds/NN sing/NN ./.");
    assert_eq!(lines[5], format!("Accuracy: {}", 27.0 / 29.0));

    let nns = ev.label("NNS").unwrap();
    assert_eq!((nns.num_correct, nns.num_prediction, nns.num_observation), (2, 2, 3));
}

#[test]
fn memorized_training_sentences() {
    init_logger();
    let model = trained();
    let mut tagger = HmmTagger::new(&model, &TaggerConfig::default());
    let train = Corpus::from_path("tests/data/pos.train").unwrap();
    let mut sink = WriterSink::quiet(Vec::new());
    let ev = tag_corpus(&mut tagger, &train, &mut sink).unwrap();
    assert_eq!(ev.accuracy(), Some(1.0));
    assert_eq!(ev.instance_accuracy(), Some(1.0));
}

#[test]
fn deterministic() {
    let model = trained();
    let test = Corpus::from_path("tests/data/pos.test").unwrap();
    let run = || {
        let mut tagger = HmmTagger::new(&model, &TaggerConfig::default());
        test.sentences.iter().map(|s| tagger.tag(&s.words())).collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

#[test]
fn concurrent_taggers_share_model() {
    let model = trained();
    let test = Corpus::from_path("tests/data/pos.test").unwrap();
    let config = TaggerConfig::default();

    let mut expected = Evaluation::default();
    let mut tagger = HmmTagger::new(&model, &config);
    for seq in &test.sentences {
        expected.accumulate(&seq.tags(), &tagger.tag(&seq.words())).unwrap();
    }

    let mut merged = Evaluation::default();
    thread::scope(|s| {
        let handles: Vec<_> = test
            .sentences
            .chunks(2)
            .map(|chunk| {
                let (model, config) = (&model, &config);
                s.spawn(move || {
                    let mut tagger = HmmTagger::new(model, config);
                    let mut ev = Evaluation::default();
                    for seq in chunk {
                        ev.accumulate(&seq.tags(), &tagger.tag(&seq.words())).unwrap();
                    }
                    ev
                })
            })
            .collect();
        for h in handles {
            merged.merge(&h.join().unwrap());
        }
    });
    assert_eq!((merged.correct(), merged.total()), (expected.correct(), expected.total()));
    assert_eq!(merged.num_sentences(), test.len());
}

#[test]
fn most_frequent_default() {
    let model = trained();
    // DT and NN tie at 17; DT was seen first
    let config = TaggerConfig { default_tag: DefaultTag::MostFrequent };
    let mut tagger = HmmTagger::new(&model, &config);
    assert_eq!(tagger.fallback_tag(), "DT");
    assert_eq!(tagger.tag(&["xyzzy"]), ["DT"]);
}

#[test]
fn open_class_default() {
    let model = trained();
    // NN emits ten distinct words, DT only two
    let config = TaggerConfig { default_tag: DefaultTag::OpenClass };
    let mut tagger = HmmTagger::new(&model, &config);
    assert_eq!(tagger.fallback_tag(), "NN");
    assert_eq!(tagger.tag(&["the", "xyzzy", "sleeps"]), ["DT", "NN", "VBZ"]);
}

#[test]
fn length_mismatch_is_rejected() {
    let model = trained();
    let mut tagger = HmmTagger::new(&model, &TaggerConfig::default());
    let prediction = tagger.tag(&["the", "dog"]);
    let mut ev = Evaluation::default();
    assert!(matches!(ev.accumulate(&["DT"], &prediction), Err(Error::LengthMismatch { expected: 1, actual: 2 })));
    assert_eq!(ev.to_string(), "Accuracy not calculated yet");
}

#[test]
fn empty_training_corpus() {
    let model = HmmModel::train(&Corpus::default());
    let mut tagger = HmmTagger::new(&model, &TaggerConfig::default());
    let test = Corpus::parse_lines(["the/DT dog/NN"]).unwrap();
    let mut sink = WriterSink::new(Vec::new());
    let ev = tag_corpus(&mut tagger, &test, &mut sink).unwrap();
    assert_eq!((ev.correct(), ev.total()), (1, 2));
    let out = String::from_utf8(sink.into_inner()).unwrap();
    assert_eq!(out, "the/NN dog/NN\nAccuracy: 0.5\n");
}
