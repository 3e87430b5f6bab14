//! Fixed boilerplate texts required by the publication format.

/// Human-readable category name used in the top block and page footers.
pub(crate) fn category_name(category: &str) -> Option<&'static str> {
    match category {
        "std" => Some("Standards-Track"),
        "bcp" => Some("Best Current Practices"),
        "exp" => Some("Experimental Protocol"),
        "info" => Some("Informational"),
        "historic" => Some("Historic"),
        _ => None,
    }
}

/// "Status of this Memo" paragraph for published RFCs, keyed by category.
pub(crate) fn status_text(category: &str) -> Option<&'static str> {
    match category {
        "std" => Some(
            "This document specifies an Internet standards track protocol for \
             the Internet community, and requests discussion and suggestions \
             for improvements.  Please refer to the current edition of the \
             \"Internet Official Protocol Standards\" (STD 1) for the \
             standardization state and status of this protocol.  Distribution \
             of this memo is unlimited.",
        ),
        "bcp" => Some(
            "This document specifies an Internet Best Current Practices for \
             the Internet Community, and requests discussion and suggestions \
             for improvements. Distribution of this memo is unlimited.",
        ),
        "exp" => Some(
            "This memo defines an Experimental Protocol for the Internet \
             community.  This memo does not specify an Internet standard of \
             any kind.  Discussion and suggestions for improvement are \
             requested. Distribution of this memo is unlimited.",
        ),
        "info" => Some(
            "This memo provides information for the Internet community. This \
             memo does not specify an Internet standard of any kind. \
             Distribution of this memo is unlimited.",
        ),
        _ => None,
    }
}

const IPR_TRUST200902: [&str; 3] = [
    "This Internet-Draft is submitted in full conformance with the \
     provisions of BCP 78 and BCP 79.",
    "Internet-Drafts are working documents of the Internet Engineering \
     Task Force (IETF).  Note that other groups may also distribute \
     working documents as Internet-Drafts.  The list of current Internet- \
     Drafts is at http://datatracker.ietf.org/drafts/current/.",
    "Internet-Drafts are draft documents valid for a maximum of six months \
     and may be updated, replaced, or obsoleted by other documents at any \
     time.  It is inappropriate to use Internet-Drafts as reference \
     material or to cite them other than as \"work in progress.\"",
];

const IPR_NO_MODIFICATION: &str =
    "This document may not be modified, and derivative works of it may \
     not be created, except to format it for publication as an RFC or \
     to translate it into languages other than English.";

const IPR_NO_DERIVATIVES: &str =
    "This document may not be modified, and derivative works of it may \
     not be created, and it may not be published except as an \
     Internet-Draft.";

const IPR_PRE5378: &str =
    "This document may contain material from IETF Documents or IETF \
     Contributions published or made publicly available before \
     November 10, 2008. The person(s) controlling the copyright in some \
     of this material may not have granted the IETF Trust the right to \
     allow modifications of such material outside the IETF Standards \
     Process. Without obtaining an adequate license from the person(s) \
     controlling the copyright in such materials, this document may not \
     be modified outside the IETF Standards Process, and derivative \
     works of it may not be created outside the IETF Standards Process, \
     except to format it for publication as an RFC or to translate it \
     into languages other than English.";

/// Status paragraphs for Internet-Drafts, keyed by the `ipr` attribute.
pub(crate) fn ipr_paragraphs(ipr: &str) -> Option<Vec<&'static str>> {
    let mut pars: Vec<&'static str> = IPR_TRUST200902.to_vec();
    match ipr {
        "trust200902" => {}
        "noModificationTrust200902" => pars.push(IPR_NO_MODIFICATION),
        "noDerivativesTrust200902" => pars.push(IPR_NO_DERIVATIVES),
        "pre5378Trust200902" => pars.push(IPR_PRE5378),
        _ => return None,
    }
    Some(pars)
}

pub(crate) const DRAFT_COPYRIGHT: &str =
    "This document is subject to BCP 78 and the IETF Trust's Legal \
     Provisions Relating to IETF Documents \
     (http://trustee.ietf.org/license-info) in effect on the date of \
     publication of this document.  Please review these documents \
     carefully, as they describe your rights and restrictions with respect \
     to this document.  Code Components extracted from this document must \
     include Simplified BSD License text as described in Section 4.e of \
     the Trust Legal Provisions and are provided without warranty as \
     described in the Simplified BSD License.";
