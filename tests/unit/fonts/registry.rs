use super::*;

const FONT_DIR: &str = "tests/data/fonts";
const MONO: &str = "DejaVuSansMono";

#[test]
fn same_name_returns_shared_program() {
    let reg = FontRegistry::new(FONT_DIR);
    assert!(reg.is_empty());

    let a = reg.get(MONO).unwrap();
    let b = reg.get(MONO).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(reg.len(), 1);
    assert_eq!(a.name(), MONO);
}

#[test]
fn missing_font_file_is_validation_error() {
    let reg = FontRegistry::new(FONT_DIR);
    let err = reg.get("NoSuchFont").unwrap_err();
    assert!(matches!(err, ImprintError::Validation(_)), "{err}");
    assert!(reg.is_empty());
}

#[test]
fn malformed_font_bytes_are_rejected() {
    let reg = FontRegistry::new(FONT_DIR);
    let err = reg.register("Broken", b"definitely not a font").unwrap_err();
    assert!(err.to_string().contains("malformed font"), "{err}");
}

#[test]
fn embedded_bytes_are_kept_apart_from_directory_fonts() {
    let bytes = std::fs::read(format!("{FONT_DIR}/{MONO}.ttf")).unwrap();
    // Trailing padding leaves the tables readable but changes the content.
    let mut other = bytes.clone();
    other.extend_from_slice(&[0; 64]);

    let reg = FontRegistry::new(FONT_DIR);
    let from_dir = reg.get(MONO).unwrap();
    let embedded = reg.register(MONO, &other).unwrap();
    assert!(!Arc::ptr_eq(&from_dir, &embedded));
    assert_eq!(embedded.data().data.as_ref().len(), other.len());

    // The directory lookup is unaffected by the embedded program.
    assert!(Arc::ptr_eq(&reg.get(MONO).unwrap(), &from_dir));
    assert_eq!(reg.len(), 2);
}

#[test]
fn identical_embedded_bytes_share_one_program() {
    let bytes = std::fs::read(format!("{FONT_DIR}/{MONO}.ttf")).unwrap();
    let reg = FontRegistry::new("does/not/exist");
    let a = reg.register("Embedded", &bytes).unwrap();
    let b = reg.register("Embedded", &bytes).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert!(reg.get("Embedded").is_err());
    assert_eq!(reg.len(), 1);
}

#[test]
fn concurrent_first_loads_parse_once() {
    let reg = Arc::new(FontRegistry::new(FONT_DIR));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let reg = Arc::clone(&reg);
            std::thread::spawn(move || reg.get(MONO).unwrap())
        })
        .collect();
    let fonts: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(fonts.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    assert_eq!(reg.len(), 1);
}
