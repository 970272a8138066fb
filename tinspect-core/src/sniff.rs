use std::fs::File;
use std::io::Read;
use std::path::Path;
use tinspect_common::Result;

pub const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b'\t', b';', b'|'];

// share of sampled records that must agree on the field count
const MIN_CONSISTENCY: f64 = 0.9;

#[derive(Debug, Clone, PartialEq)]
pub struct DelimiterScore {
    pub delimiter: u8,
    pub fields: usize,
    pub records: usize,
    pub consistency: f64,
}

/// read at most `limit` bytes from the start of the file
pub fn read_sample(path: &Path, limit: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(limit.min(1 << 20));
    File::open(path)?.take(limit as u64).read_to_end(&mut buf)?;
    Ok(buf)
}

/// drop a trailing partial line left behind by the sample cut
fn complete_lines(sample: &[u8]) -> &[u8] {
    match sample.iter().rposition(|&b| b == b'\n') {
        Some(pos) if pos + 1 < sample.len() => &sample[..=pos],
        _ => sample,
    }
}

pub fn score_delimiter(sample: &[u8], delimiter: u8) -> Option<DelimiterScore> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(sample);
    let mut counts: Vec<usize> = Vec::new();
    let mut record = csv::ByteRecord::new();
    loop {
        match reader.read_byte_record(&mut record) {
            Ok(true) => counts.push(record.len()),
            Ok(false) => break,
            Err(_) => return None,
        }
    }
    if counts.is_empty() {
        return None;
    }
    let mut tally: Vec<(usize, usize)> = Vec::new();
    for c in &counts {
        match tally.iter_mut().find(|(fields, _)| fields == c) {
            Some((_, n)) => *n += 1,
            None => tally.push((*c, 1)),
        }
    }
    // modal field count; ties go to the wider layout
    let (fields, agreeing) = tally
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)))?;
    Some(DelimiterScore {
        delimiter,
        fields,
        records: counts.len(),
        consistency: agreeing as f64 / counts.len() as f64,
    })
}

pub fn sniff_delimiter(sample: &[u8]) -> std::result::Result<u8, String> {
    let sample = complete_lines(sample);
    if sample.iter().all(|b| b.is_ascii_whitespace()) {
        return Err("sample is empty".into());
    }
    let best = CANDIDATE_DELIMITERS
        .iter()
        .filter_map(|&d| score_delimiter(sample, d))
        .filter(|s| s.fields >= 2 && s.consistency >= MIN_CONSISTENCY)
        .fold(None::<DelimiterScore>, |best, s| match best {
            Some(b)
                if b.consistency > s.consistency
                    || (b.consistency == s.consistency && b.fields >= s.fields) =>
            {
                Some(b)
            }
            _ => Some(s),
        });
    best.map(|s| s.delimiter)
        .ok_or_else(|| "no candidate delimiter gives a consistent column count".into())
}
