use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{EvalError, EvalResult};

const GERMAN: &str = "
aber alle allem allen aller alles als also am an ander andere anderem anderen anderer anderes
anderm andern anderr anders auch auf aus bei bin bis bist da damit dann der den des dem die das
dass daß derselbe derselben denselben desselben demselben dieselbe dieselben dasselbe dazu dein
deine deinem deinen deiner deines denn derer dessen dich dir du dies diese diesem diesen dieser
dieses doch dort durch ein eine einem einen einer eines einig einige einigem einigen einiger
einiges einmal er ihn ihm es etwas euer eure eurem euren eurer eures für gegen gewesen hab habe
haben hat hatte hatten hier hin hinter ich mich mir ihr ihre ihrem ihren ihrer ihres euch im in
indem ins ist jede jedem jeden jeder jedes jene jenem jenen jener jenes jetzt kann kein keine
keinem keinen keiner keines können könnte machen man manche manchem manchen mancher manches mein
meine meinem meinen meiner meines mit muss musste nach nicht nichts noch nun nur ob oder ohne
sehr sein seine seinem seinen seiner seines selbst sich sie ihnen sind so solche solchem solchen
solcher solches soll sollte sondern sonst über um und uns unsere unserem unseren unser unseres
unter viel vom von vor während war waren warst was weg weil weiter welche welchem welchen welcher
welches wenn werde werden wie wieder will wir wird wirst wo wollen wollte würde würden zu zum zur
zwar zwischen
";

const ENGLISH: &str = "
i me my myself we our ours ourselves you you're you've you'll you'd your yours yourself
yourselves he him his himself she she's her hers herself it it's its itself they them their
theirs themselves what which who whom this that that'll these those am is are was were be been
being have has had having do does did doing a an the and but if or because as until while of at
by for with about against between into through during before after above below to from up down
in out on off over under again further then once here there when where why how all any both each
few more most other some such no nor not only own same so than too very s t can will just don
don't should should've now d ll m o re ve y ain aren aren't couldn couldn't didn didn't doesn
doesn't hadn hadn't hasn hasn't haven haven't isn isn't ma mightn mightn't mustn mustn't needn
needn't shan shan't shouldn shouldn't wasn wasn't weren weren't won won't wouldn wouldn't
";

const FRENCH: &str = "
au aux avec ce ces dans de des du elle en et eux il ils je la le les leur lui ma mais me même mes
moi mon ne nos notre nous on ou par pas pour qu que qui sa se ses son sur ta te tes toi ton tu un
une vos votre vous c d j l à m n s t y été étée étées étés étant étante étants étantes suis es est
sommes êtes sont serai seras sera serons serez seront serais serait serions seriez seraient étais
était étions étiez étaient fus fut fûmes fûtes furent sois soit soyons soyez soient fusse fusses
fût fussions fussiez fussent ayant ayante ayantes ayants eu eue eues eus ai as avons avez ont
aurai auras aura aurons aurez auront aurais aurait aurions auriez auraient avais avait avions
aviez avaient eut eûmes eûtes eurent aie aies ait ayons ayez aient eusse eusses eût eussions
eussiez eussent
";

const ITALIAN: &str = "
ad al allo ai agli all agl alla alle con col coi da dal dallo dai dagli dall dagl dalla dalle di
del dello dei degli dell degl della delle in nel nello nei negli nell negl nella nelle su sul
sullo sui sugli sull sugl sulla sulle per tra contro io tu lui lei noi voi loro mio mia miei mie
tuo tua tuoi tue suo sua suoi sue nostro nostra nostri nostre vostro vostra vostri vostre mi ti
ci vi lo la li le gli ne il un uno una ma ed se perché anche come dov dove che chi cui non più
quale quanto quanti quanta quante quello quelli quella quelle questo questi questa queste si
tutto tutti a c e i l o ho hai ha abbiamo avete hanno abbia abbiate abbiano avrò avrai avrà
avremo avrete avranno sono sei è siamo siete era eri eravamo eravate erano fui fosti fu fummo
foste furono sia siate siano sarò sarai sarà saremo sarete saranno
";

fn builtin(language: &str) -> Option<&'static str> {
    match language.to_ascii_lowercase().as_str() {
        "deu" | "ger" | "de" | "german" => Some(GERMAN),
        "eng" | "en" | "english" => Some(ENGLISH),
        "fra" | "fre" | "fr" | "french" => Some(FRENCH),
        "ita" | "it" | "italian" => Some(ITALIAN),
        _ => None,
    }
}

/// Lowercased tokens excluded from information retrieval metrics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopwordSet {
    words: HashSet<String>,
}

impl StopwordSet {
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|word| word.as_ref().trim().to_lowercase())
                .filter(|word| !word.is_empty())
                .collect(),
        }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(&token.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }
}

/// Resolves stopword sets by ISO 639 code, consulting `<dir>/<code>.txt`
/// before the built-in lists.
#[derive(Debug, Clone, Default)]
pub struct StopwordLookup {
    directory: Option<PathBuf>,
}

impl StopwordLookup {
    pub fn new(directory: Option<PathBuf>) -> Self {
        Self { directory }
    }

    pub fn resolve(&self, language: &str) -> EvalResult<StopwordSet> {
        let language = language.trim();
        if let Some(directory) = &self.directory {
            let path = directory.join(format!("{language}.txt"));
            if path.is_file() {
                let set = load_stopword_file(&path)?;
                debug!(language, path = %path.display(), words = set.len(), "loaded stopwords");
                return Ok(set);
            }
        }

        builtin(language)
            .map(|words| StopwordSet::from_words(words.split_whitespace()))
            .ok_or_else(|| EvalError::UnsupportedLanguage(language.to_string()))
    }
}

fn load_stopword_file(path: &Path) -> EvalResult<StopwordSet> {
    let content = fs::read_to_string(path).map_err(|source| EvalError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(StopwordSet::from_words(
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.starts_with('#')),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_lists_resolve_by_iso_code() {
        let lookup = StopwordLookup::default();
        let german = lookup.resolve("deu").unwrap();
        assert!(german.contains("und"));
        assert!(german.contains("Der"));
        assert_eq!(lookup.resolve("ger").unwrap(), german);
        assert!(lookup.resolve("eng").unwrap().contains("the"));
    }

    #[test]
    fn unknown_language_is_unsupported() {
        let err = StopwordLookup::default().resolve("xyz").unwrap_err();
        assert_eq!(err.kind(), "unsupported_language");
    }

    #[test]
    fn directory_list_overrides_builtin() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("deu.txt"), "# custom\nZeitung\n\nBlatt\n").unwrap();
        fs::write(dir.path().join("lat.txt"), "et\nin\n").unwrap();

        let lookup = StopwordLookup::new(Some(dir.path().to_path_buf()));
        let german = lookup.resolve("deu").unwrap();
        assert_eq!(german.len(), 2);
        assert!(german.contains("zeitung"));
        assert!(!german.contains("und"));
        assert!(lookup.resolve("lat").unwrap().contains("et"));
        assert!(lookup.resolve("eng").unwrap().contains("the"));
    }
}
