// Letter-frequency scoring for telling English plaintext apart from noise.
//
// Letters are case-folded before counting. A single-byte XOR key and its
// case-flipped twin (k vs k ^ 0x20) then tie on letters alone; the space and
// punctuation weighting splits that pair, since the twin decodes spaces to
// unprintable bytes.

// http://practicalcryptography.com/cryptanalysis/letter-frequencies-various-languages/english-letter-frequencies/
const LETTER_FREQUENCIES: [f64; 26] = [
    0.08551690673195275,   // A
    0.016047959168228293,  // B
    0.03164435380900101,   // C
    0.03871183735737418,   // D
    0.1209652247516903,    // E
    0.021815103969122528,  // F
    0.020863354250923158,  // G
    0.04955707280570641,   // H
    0.0732511860723129,    // I
    0.002197788956104563,  // J
    0.008086975227142329,  // K
    0.04206464329306453,   // L
    0.025263217360184446,  // M
    0.07172184876283856,   // N
    0.07467265410810447,   // O
    0.020661660788966266,  // P
    0.0010402453014323196, // Q
    0.0633271013284023,    // R
    0.06728203117491646,   // S
    0.08938126949659495,   // T
    0.026815809362304373,  // U
    0.01059346274662571,   // V
    0.018253618950416498,  // W
    0.0019135048594134572, // X
    0.017213606152473405,  // Y
    0.001137563214703838,  // Z
];

const COMMON_PUNCTUATION: &[u8] = b" ,.!?'\":;";

/// Score how English-like a byte sequence is; higher is more likely English.
pub fn score_english(bytes: &[u8]) -> f64 {
    if bytes.is_empty() {
        return 0.0;
    }

    let mut counts = [0u64; 26];
    let mut relevant_chars = 0f64;
    for &b in bytes {
        let b = b.to_ascii_lowercase();
        if b.is_ascii_lowercase() {
            counts[(b - b'a') as usize] += 1;
            relevant_chars += 1.0;
        } else if COMMON_PUNCTUATION.contains(&b) {
            relevant_chars += 0.5;
        }
    }

    let chi = chi_squared(&counts);
    if chi == 0.0 {
        return 1.0;
    }

    // Short inputs carry too few letters for the distribution to mean much,
    // so the fraction of English-looking characters dominates there.
    let weight = relevant_chars / bytes.len() as f64;
    let confidence = (bytes.len() as f64 / 40.0).min(1.0);
    confidence * weight / chi + (1.0 - confidence) * weight
}

fn chi_squared(observed: &[u64; 26]) -> f64 {
    let total: u64 = observed.iter().sum();
    if total == 0 {
        return f64::INFINITY;
    }
    let total = total as f64;
    observed
        .iter()
        .zip(LETTER_FREQUENCIES)
        .map(|(&obs, freq)| {
            let expected = freq * total;
            (obs as f64 - expected).powi(2) / expected
        })
        .sum()
}
