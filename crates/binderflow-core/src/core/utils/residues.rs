use phf::{Map, phf_map};

/// One-letter code used for residues outside the standard table.
pub const UNKNOWN_RESIDUE: char = 'X';

static THREE_TO_ONE: Map<&'static str, char> = phf_map! {
    "ALA" => 'A', "CYS" => 'C', "ASP" => 'D', "GLU" => 'E', "PHE" => 'F',
    "GLY" => 'G', "HIS" => 'H', "ILE" => 'I', "LYS" => 'K', "LEU" => 'L',
    "MET" => 'M', "ASN" => 'N', "PRO" => 'P', "GLN" => 'Q', "ARG" => 'R',
    "SER" => 'S', "THR" => 'T', "VAL" => 'V', "TRP" => 'W', "TYR" => 'Y',
};

/// Maps a three-letter residue name to its one-letter code, falling back to `X`.
pub fn one_letter_code(residue_name: &str) -> char {
    THREE_TO_ONE
        .get(residue_name.trim())
        .copied()
        .unwrap_or(UNKNOWN_RESIDUE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_residues_map_to_one_letter_codes() {
        assert_eq!(one_letter_code("ALA"), 'A');
        assert_eq!(one_letter_code("TRP"), 'W');
        assert_eq!(one_letter_code(" GLY "), 'G');
    }

    #[test]
    fn table_covers_exactly_the_twenty_standard_residues() {
        assert_eq!(THREE_TO_ONE.len(), 20);
    }

    #[test]
    fn unknown_residues_map_to_sentinel() {
        assert_eq!(one_letter_code("MSE"), 'X');
        assert_eq!(one_letter_code("HOH"), 'X');
        assert_eq!(one_letter_code(""), 'X');
    }
}
