/// Compile a regex once and hand out a `&'static Regex`.
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).expect("invalid built-in regex"));
        &*RE
    }};
}

/// `letter!(Q)` in tests.
#[cfg(test)]
macro_rules! letter {
    ($c:ident) => {
        $crate::Letter::from_char(stringify!($c).chars().next().unwrap_or('?'))
            .expect(concat!("not a letter: ", stringify!($c)))
    };
}

/// `pair!(A - B)` in tests.
#[cfg(test)]
macro_rules! pair {
    ($a:ident - $b:ident) => {
        $crate::PairKey::new(letter!($a), letter!($b)).expect(concat!("not a pair: ", stringify!($a - $b)))
    };
}
