// ui/constants.rs

pub const ART: &str = r#"
                 ___________
                /     |     \
               /  ====+====  \
      ________/_______|_______\________
     |________________________________|
      |  ||  |  ||  |  ||  |  ||  |  |
      |  ||  |  ||  |  ||  |  ||  |  |
      |  ||  |  ||  |  ||  |  ||  |  |
      |  ||  |  ||  |  ||  |  ||  |  |
     _|__||__|__||__|__||__|__||__|__|_
    |__________________________________|
   |____________________________________|
"#;

pub const TITLE: &str = r#"
 _                 ___ _              _
| |   _____ __    / __(_)_ __ _  _ _ | |__ _ __ _ _ __ _
| |__/ -_) \ /    \__ \ | '  \ || | || / _` / _| '_/ _` |
|____\___/_\_\    |___/_|_|_|_\_,_|_||_\__,_\__|_| \__,_|
"#;

pub const SIDE_HINT: &str = "Press d to defend, p to prosecute, Esc to leave";
