//! Built-in binary signature table.
//!
//! Each entry lists, for one lowercase file extension, the candidate
//! signatures as `(byte offset, uppercase hex)` pairs and the MIME type they
//! identify. Candidates are tried in the order listed. Entries that share a
//! container format (ZIP-based office documents, EPUB, JAR) share patterns;
//! lookup is gated on the file's own extension so they never compete.

/// Signatures identifying one file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureEntry {
    /// Lowercase extension without the leading dot.
    pub extension: &'static str,
    /// Candidate `(offset, hex)` signatures, in match order.
    pub signatures: &'static [(u64, &'static str)],
    /// The MIME type reported when any candidate matches.
    pub mime: &'static str,
}

macro_rules! entry {
    ($ext:literal, $mime:literal, [$(($offset:expr, $hex:expr)),+ $(,)?]) => {
        SignatureEntry {
            extension: $ext,
            signatures: &[$(($offset, $hex)),+],
            mime: $mime,
        }
    };
}

const ZIP: &str = "504B0304";
const OLE2: &str = "D0CF11E0A1B11AE1";
const EBML: &str = "1A45DFA3";
const OGG: &str = "4F676753";

/// The default signature table used by [`sniff`](super::sniff).
pub static SIGNATURES: &[SignatureEntry] = &[
    // images
    entry!("png", "image/png", [(0, "89504E470D0A1A0A")]),
    entry!("jpg", "image/jpeg", [(0, "FFD8FF")]),
    entry!("jpeg", "image/jpeg", [(0, "FFD8FF")]),
    entry!("jpe", "image/jpeg", [(0, "FFD8FF")]),
    entry!("gif", "image/gif", [(0, "474946383761"), (0, "474946383961")]),
    entry!("bmp", "image/bmp", [(0, "424D")]),
    entry!("webp", "image/webp", [(8, "57454250")]),
    entry!("tif", "image/tiff", [(0, "49492A00"), (0, "4D4D002A")]),
    entry!("tiff", "image/tiff", [(0, "49492A00"), (0, "4D4D002A")]),
    entry!("ico", "image/vnd.microsoft.icon", [(0, "00000100")]),
    entry!("cur", "image/x-icon", [(0, "00000200")]),
    entry!("icns", "image/icns", [(0, "69636E73")]),
    entry!("psd", "image/vnd.adobe.photoshop", [(0, "38425053")]),
    entry!("avif", "image/avif", [(4, "6674797061766966"), (4, "6674797061766973")]),
    entry!(
        "heic",
        "image/heic",
        [(4, "6674797068656963"), (4, "6674797068656978"), (4, "667479706D696631")]
    ),
    entry!("jp2", "image/jp2", [(0, "0000000C6A5020200D0A870A")]),
    entry!("djvu", "image/vnd.djvu", [(0, "41542654464F524D")]),
    entry!("dcm", "application/dicom", [(128, "4449434D")]),
    // documents
    entry!("pdf", "application/pdf", [(0, "255044462D")]),
    entry!("ps", "application/postscript", [(0, "25215053")]),
    entry!("eps", "application/postscript", [(0, "25215053"), (0, "C5D0D3C6")]),
    entry!("rtf", "application/rtf", [(0, "7B5C72746631")]),
    entry!("xml", "application/xml", [(0, "3C3F786D6C20"), (0, "EFBBBF3C3F786D6C20")]),
    entry!("doc", "application/msword", [(0, OLE2)]),
    entry!("xls", "application/vnd.ms-excel", [(0, OLE2)]),
    entry!("ppt", "application/vnd.ms-powerpoint", [(0, OLE2)]),
    entry!("msg", "application/vnd.ms-outlook", [(0, OLE2)]),
    entry!(
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        [(0, ZIP)]
    ),
    entry!("xlsx", "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet", [(0, ZIP)]),
    entry!(
        "pptx",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        [(0, ZIP)]
    ),
    entry!("odt", "application/vnd.oasis.opendocument.text", [(0, ZIP)]),
    entry!("ods", "application/vnd.oasis.opendocument.spreadsheet", [(0, ZIP)]),
    entry!("odp", "application/vnd.oasis.opendocument.presentation", [(0, ZIP)]),
    entry!("epub", "application/epub+zip", [(0, ZIP)]),
    entry!("mobi", "application/x-mobipocket-ebook", [(60, "424F4F4B4D4F4249")]),
    // archives
    entry!("zip", "application/zip", [(0, ZIP), (0, "504B0506"), (0, "504B0708")]),
    entry!("jar", "application/java-archive", [(0, ZIP)]),
    entry!("apk", "application/vnd.android.package-archive", [(0, ZIP)]),
    entry!("gz", "application/gzip", [(0, "1F8B")]),
    entry!("tgz", "application/gzip", [(0, "1F8B")]),
    entry!("bz2", "application/x-bzip2", [(0, "425A68")]),
    entry!("xz", "application/x-xz", [(0, "FD377A585A00")]),
    entry!("zst", "application/zstd", [(0, "28B52FFD")]),
    entry!("lz", "application/x-lzip", [(0, "4C5A4950")]),
    entry!("7z", "application/x-7z-compressed", [(0, "377ABCAF271C")]),
    entry!("rar", "application/vnd.rar", [(0, "526172211A0700"), (0, "526172211A070100")]),
    entry!("tar", "application/x-tar", [(257, "7573746172")]),
    entry!("cab", "application/vnd.ms-cab-compressed", [(0, "4D534346")]),
    entry!("deb", "application/vnd.debian.binary-package", [(0, "213C617263683E")]),
    entry!("rpm", "application/x-rpm", [(0, "EDABEEDB")]),
    entry!(
        "iso",
        "application/x-iso9660-image",
        [(32769, "4344303031"), (34817, "4344303031"), (36865, "4344303031")]
    ),
    // audio
    entry!("mp3", "audio/mpeg", [(0, "494433"), (0, "FFFB"), (0, "FFF3"), (0, "FFF2")]),
    entry!("wav", "audio/wav", [(8, "57415645")]),
    entry!("flac", "audio/flac", [(0, "664C6143")]),
    entry!("ogg", "audio/ogg", [(0, OGG)]),
    entry!("oga", "audio/ogg", [(0, OGG)]),
    entry!("opus", "audio/opus", [(0, OGG)]),
    entry!("aac", "audio/aac", [(0, "FFF1"), (0, "FFF9")]),
    entry!("m4a", "audio/mp4", [(4, "667479704D344120")]),
    entry!("mid", "audio/midi", [(0, "4D546864")]),
    entry!("midi", "audio/midi", [(0, "4D546864")]),
    entry!("wma", "audio/x-ms-wma", [(0, "3026B2758E66CF11")]),
    // video
    entry!(
        "mp4",
        "video/mp4",
        [
            (4, "6674797069736F6D"),
            (4, "667479706D703432"),
            (4, "667479706D703431"),
            (4, "667479704D534E56"),
        ]
    ),
    entry!("m4v", "video/x-m4v", [(4, "667479704D345620")]),
    entry!("mov", "video/quicktime", [(4, "6674797071742020"), (4, "6D6F6F76")]),
    entry!("3gp", "video/3gpp", [(4, "6674797033677035"), (4, "6674797033677034")]),
    entry!("avi", "video/x-msvideo", [(8, "41564920")]),
    entry!("mkv", "video/x-matroska", [(0, EBML)]),
    entry!("webm", "video/webm", [(0, EBML)]),
    entry!("ogv", "video/ogg", [(0, OGG)]),
    entry!("flv", "video/x-flv", [(0, "464C56")]),
    entry!("mpg", "video/mpeg", [(0, "000001BA"), (0, "000001B3")]),
    entry!("mpeg", "video/mpeg", [(0, "000001BA"), (0, "000001B3")]),
    entry!("wmv", "video/x-ms-wmv", [(0, "3026B2758E66CF11")]),
    entry!("asf", "video/x-ms-asf", [(0, "3026B2758E66CF11")]),
    entry!("swf", "application/x-shockwave-flash", [(0, "465753"), (0, "435753"), (0, "5A5753")]),
    // fonts
    entry!("woff", "font/woff", [(0, "774F4646")]),
    entry!("woff2", "font/woff2", [(0, "774F4632")]),
    entry!("ttf", "font/ttf", [(0, "0001000000")]),
    entry!("otf", "font/otf", [(0, "4F54544F")]),
    entry!("eot", "application/vnd.ms-fontobject", [(34, "4C50")]),
    // executables and data
    entry!("wasm", "application/wasm", [(0, "0061736D")]),
    entry!("exe", "application/vnd.microsoft.portable-executable", [(0, "4D5A")]),
    entry!("dll", "application/vnd.microsoft.portable-executable", [(0, "4D5A")]),
    entry!("so", "application/x-sharedlib", [(0, "7F454C46")]),
    entry!("class", "application/java-vm", [(0, "CAFEBABE")]),
    entry!("crx", "application/x-chrome-extension", [(0, "43723234")]),
    entry!("sqlite", "application/vnd.sqlite3", [(0, "53514C69746520666F726D6174203300")]),
    entry!("db", "application/vnd.sqlite3", [(0, "53514C69746520666F726D6174203300")]),
    entry!("parquet", "application/vnd.apache.parquet", [(0, "50415231")]),
    entry!("pcap", "application/vnd.tcpdump.pcap", [(0, "D4C3B2A1"), (0, "A1B2C3D4")]),
];

/// Finds the entry for a lowercase extension.
pub fn lookup<'a>(table: &'a [SignatureEntry], extension: &str) -> Option<&'a SignatureEntry> {
    table.iter().find(|entry| entry.extension == extension)
}
