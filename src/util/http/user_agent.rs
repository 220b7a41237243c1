use rand::Rng;

const FIREFOX_VERSIONS: [&str; 8] = [
    "133.0", "132.0", "131.0", "130.0", "129.0", "128.0", "127.0", "126.0",
];

const CHROME_VERSIONS: [&str; 10] = [
    "133.0.6943.50",
    "132.0.6834.83",
    "131.0.6778.85",
    "130.0.6723.92",
    "129.0.6668.70",
    "128.0.6613.120",
    "127.0.6533.88",
    "126.0.6478.126",
    "125.0.6422.141",
    "124.0.6367.201",
];

const OS_STRINGS: [&str; 8] = [
    "Windows NT 10.0; Win64; x64",
    "Windows NT 10.0; Win64; x64",
    "Macintosh; Intel Mac OS X 10_15_7",
    "Macintosh; Intel Mac OS X 14_7_2",
    "X11; Linux x86_64",
    "X11; Ubuntu; Linux x86_64",
    "X11; Fedora; Linux x86_64",
    "X11; Debian; Linux x86_64",
];

/// Produces a plausible desktop browser user agent, randomized per client so
/// repeated runs do not share an obvious fingerprint.
pub fn gen_random_ua() -> String {
    let mut rng = rand::rng();

    if rng.random_range(0..2) == 0 {
        gen_firefox_ua()
    } else {
        gen_chrome_ua()
    }
}

fn gen_firefox_ua() -> String {
    let mut rng = rand::rng();
    let version = FIREFOX_VERSIONS[rng.random_range(0..FIREFOX_VERSIONS.len())];
    let os = OS_STRINGS[rng.random_range(0..OS_STRINGS.len())];

    format!(
        "Mozilla/5.0 ({}; rv:{}) Gecko/20100101 Firefox/{}",
        os, version, version
    )
}

fn gen_chrome_ua() -> String {
    let mut rng = rand::rng();
    let version = CHROME_VERSIONS[rng.random_range(0..CHROME_VERSIONS.len())];
    let os = OS_STRINGS[rng.random_range(0..OS_STRINGS.len())];

    format!(
        "Mozilla/5.0 ({}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{} Safari/537.36",
        os, version
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gen_random_ua() {
        let ua = gen_random_ua();
        assert!(ua.starts_with("Mozilla/5.0"));
        assert!(ua.contains("Firefox") || ua.contains("Chrome"));
    }
}
