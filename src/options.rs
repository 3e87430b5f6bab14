use crate::diag::Diagnostics;

/// Which output strategy the writer uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputMode {
    /// Unpaginated text: no headers, footers or page numbers.
    Raw,
    /// Classic 51-lines-per-page layout with running headers and footers.
    Paginated,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Eol {
    Lf,
    CrLf,
}

impl Eol {
    pub fn as_str(self) -> &'static str {
        match self {
            Eol::Lf => "\n",
            Eol::CrLf => "\r\n",
        }
    }
}

#[derive(Clone, Debug)]
pub struct RenderOptions {
    pub width: usize,
    pub margin: usize,
    pub mode: OutputMode,
    pub eol: Eol,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 72,
            margin: 3,
            mode: OutputMode::Paginated,
            eol: Eol::Lf,
        }
    }
}

/// Live processing-instruction state, consulted by nearly every rendering
/// decision. Defaults follow the reference option table; `<?rfc key="val"?>`
/// nodes update the state in place as the traversal encounters them.
#[derive(Clone, Debug)]
pub struct Pis {
    pub artworkdelimiter: Option<String>,
    pub artworklines: usize,
    pub autobreaks: bool,
    pub colonspace: bool,
    pub comments: bool,
    pub compact: bool,
    pub editing: bool,
    pub figurecount: bool,
    pub footer: Option<String>,
    pub header: Option<String>,
    pub refparent: String,
    pub rfcedstyle: bool,
    pub sectionorphan: usize,
    pub sortrefs: bool,
    subcompact: Option<bool>,
    pub symrefs: bool,
    pub tablecount: bool,
    pub text_list_symbols: String,
    pub toc: bool,
    pub tocappendix: bool,
    pub tocdepth: usize,
    pub tocindent: bool,
    pub tocnarrow: bool,
    pub topblock: bool,
}

impl Default for Pis {
    fn default() -> Self {
        Self {
            artworkdelimiter: None,
            artworklines: 0,
            autobreaks: true,
            colonspace: false,
            comments: false,
            compact: false,
            editing: false,
            figurecount: false,
            footer: None,
            header: None,
            refparent: "References".to_string(),
            rfcedstyle: false,
            sectionorphan: 5,
            sortrefs: false,
            subcompact: None,
            symrefs: true,
            tablecount: false,
            text_list_symbols: "o*+-".to_string(),
            toc: false,
            tocappendix: true,
            tocdepth: 3,
            tocindent: true,
            tocnarrow: true,
            topblock: true,
        }
    }
}

fn parse_yes(val: &str) -> bool {
    val == "yes"
}

impl Pis {
    /// Unset subcompact follows compact.
    pub fn subcompact(&self) -> bool {
        self.subcompact.unwrap_or(self.compact)
    }

    /// Apply one `key="value"` pair from a processing instruction.
    /// Unknown keys are ignored (the vocabulary has many writer-specific
    /// options that do not affect text output).
    pub fn set(&mut self, key: &str, val: &str, diag: &Diagnostics) {
        match key {
            "artworkdelimiter" => self.artworkdelimiter = Some(val.to_string()),
            "artworklines" => self.artworklines = val.parse().unwrap_or(0),
            "autobreaks" => self.autobreaks = parse_yes(val),
            "colonspace" => self.colonspace = parse_yes(val),
            "comments" => self.comments = parse_yes(val),
            "compact" => self.compact = parse_yes(val),
            "editing" => self.editing = parse_yes(val),
            "figurecount" => self.figurecount = parse_yes(val),
            "footer" => self.footer = Some(val.to_string()),
            "header" => self.header = Some(val.to_string()),
            "refparent" => self.refparent = val.to_string(),
            "rfcedstyle" => self.rfcedstyle = parse_yes(val),
            "sectionorphan" => self.sectionorphan = val.parse().unwrap_or(5),
            "sortrefs" => self.sortrefs = parse_yes(val),
            "subcompact" => self.subcompact = Some(parse_yes(val)),
            "symrefs" => self.symrefs = parse_yes(val),
            "tablecount" => self.tablecount = parse_yes(val),
            "text-list-symbols" => {
                if !val.is_empty() {
                    self.text_list_symbols = val.to_string();
                }
            }
            "toc" => self.toc = parse_yes(val),
            "tocappendix" => self.tocappendix = parse_yes(val),
            "tocdepth" => match val.parse::<usize>() {
                Ok(depth) => self.tocdepth = depth,
                Err(_) => {
                    diag.warn(format!(
                        "Invalid tocdepth specified, must be an integer: {val}"
                    ));
                    self.tocdepth = 3;
                }
            },
            "tocindent" => self.tocindent = parse_yes(val),
            "tocnarrow" => self.tocnarrow = parse_yes(val),
            "topblock" => self.topblock = parse_yes(val),
            _ => {}
        }
    }
}
