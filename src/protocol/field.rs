// https://mariadb.com/kb/en/library/resultset/#field-detail-flag
// https://dev.mysql.com/doc/dev/mysql-server/8.0.12/group__group__cs__column__definition__flags.html
bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct FieldFlags: u16 {
        /// Column cannot be NULL
        const NOT_NULL = 1;

        /// Column is part of a primary key
        const PRIMARY_KEY = 2;

        /// Column is part of a unique key
        const UNIQUE_KEY = 4;

        /// Column is part of a non-unique key
        const MULTIPLE_KEY = 8;

        /// Column holds blob data
        const BLOB = 16;

        /// Integer column is unsigned; selects the unsigned decoders
        const UNSIGNED = 32;

        /// Column is zero-filled on display
        const ZEROFILL = 64;

        /// String column carries binary collation; its values pass through
        /// as raw bytes
        const BINARY = 128;

        /// Column is an enumeration
        const ENUM = 256;

        /// Column auto-increments
        const AUTO_INCREMENT = 512;

        /// Column is a timestamp
        const TIMESTAMP = 1024;

        /// Column is a set
        const SET = 2048;

        /// Column has no default value
        const NO_DEFAULT_VALUE = 4096;

        /// Column is set to NOW on UPDATE
        const ON_UPDATE_NOW = 8192;

        /// Column is part of some key
        const PART_KEY = 16384;

        /// Column is numeric
        const NUM = 32768;
    }
}
